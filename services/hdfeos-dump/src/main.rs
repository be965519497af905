//! HDF-EOS dump tool.
//!
//! Prints the structure of an HDF-EOS2 or HDF-EOS5 file, or the values of
//! one field, as JSON on stdout. Logs go to stderr.

mod report;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hdfeos_core::{EntityKind, Generation, NativeApi};
use hdfeos_native::{detect_generation, load_backend, LibraryConfig};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use report::{describe_file, read_entity_field, Selection};

#[derive(Parser, Debug)]
#[command(name = "hdfeos-dump")]
#[command(about = "Dump HDF-EOS grid, swath and zonal average contents as JSON")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// File format (auto-detected from the file signature by default)
    #[arg(long, value_enum, default_value = "auto", global = true)]
    format: Format,

    /// Path to libhdfeos
    #[arg(long, env = "HDFEOS2_LIB", global = true)]
    hdfeos2_lib: Option<PathBuf>,

    /// Path to libhe5_hdfeos
    #[arg(long, env = "HDFEOS5_LIB", global = true)]
    hdfeos5_lib: Option<PathBuf>,

    /// Extra library search directories
    #[arg(long, env = "HDFEOS_LIB_DIR", value_delimiter = ':', global = true)]
    lib_dir: Vec<PathBuf>,

    /// JSON library configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Compact JSON output
    #[arg(long, global = true)]
    compact: bool,

    /// Log level
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Log as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Describe every grid, swath and zonal average in a file
    List {
        file: PathBuf,
    },

    /// Read one field
    Read {
        file: PathBuf,

        /// Entity kind
        #[arg(long, value_enum)]
        kind: Kind,

        /// Grid, swath or zonal average name
        entity: String,

        /// Field name
        field: String,

        /// First index per dimension (default zeros)
        #[arg(long, value_delimiter = ',')]
        start: Vec<usize>,

        /// Step per dimension (default ones)
        #[arg(long, value_delimiter = ',')]
        stride: Vec<usize>,

        /// Element count per dimension (default full extent)
        #[arg(long, value_delimiter = ',')]
        edge: Vec<usize>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Auto,
    He2,
    He5,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Grid,
    Swath,
    Za,
}

impl From<Kind> for EntityKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Grid => EntityKind::Grid,
            Kind::Swath => EntityKind::Swath,
            Kind::Za => EntityKind::ZonalAverage,
        }
    }
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let config = library_config(&args)?;

    let file = match &args.command {
        Command::List { file } | Command::Read { file, .. } => file.clone(),
    };
    let generation = resolve_generation(args.format, &file)?;
    info!(%generation, path = %file.display(), "Loading backend");
    let api = load_backend(generation, &config)
        .with_context(|| format!("Failed to load the {} library", generation))?;

    let json = match args.command {
        Command::List { file } => {
            let report = describe_file(api.as_ref(), &file)
                .with_context(|| format!("Failed to describe {}", file.display()))?;
            to_json(&report, args.compact)?
        }
        Command::Read {
            file,
            kind,
            entity,
            field,
            start,
            stride,
            edge,
        } => {
            let selection = Selection {
                start,
                stride,
                edge,
            };
            let data = read(api.as_ref(), &file, kind.into(), &entity, &field, &selection)?;
            to_json(&data, args.compact)?
        }
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    Ok(())
}

fn library_config(args: &Args) -> Result<LibraryConfig> {
    let base = match &args.config {
        Some(path) => LibraryConfig::from_file(path)?,
        None => LibraryConfig::from_env(),
    };
    let config = base.merge(LibraryConfig {
        hdfeos2_lib: args.hdfeos2_lib.clone(),
        hdfeos5_lib: args.hdfeos5_lib.clone(),
        search_dirs: args.lib_dir.clone(),
        ..Default::default()
    });

    if let Err(e) = config.validate() {
        bail!("Invalid library configuration: {}", e);
    }
    debug!(?config, "Library configuration");
    Ok(config)
}

fn resolve_generation(format: Format, path: &Path) -> Result<Generation> {
    match format {
        Format::He2 => Ok(Generation::Hdfeos2),
        Format::He5 => Ok(Generation::Hdfeos5),
        Format::Auto => detect_generation(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
            .with_context(|| {
                format!("{} is neither an HDF4 nor an HDF5 file; pass --format", path.display())
            }),
    }
}

fn read(
    api: &dyn NativeApi,
    path: &Path,
    kind: EntityKind,
    entity: &str,
    field: &str,
    selection: &Selection,
) -> Result<report::FieldData> {
    read_entity_field(api, path, kind, entity, field, selection)
        .with_context(|| format!("Failed to read {}/{} from {}", entity, field, path.display()))
}

fn to_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_read_command() {
        let args = Args::try_parse_from([
            "hdfeos-dump",
            "read",
            "Grid.h5",
            "--kind",
            "grid",
            "UTMGrid",
            "Pollution",
            "--start",
            "1,1",
            "--edge",
            "2,3",
            "--format",
            "he5",
        ])
        .unwrap();

        assert_eq!(args.format, Format::He5);
        match args.command {
            Command::Read {
                kind,
                entity,
                start,
                stride,
                edge,
                ..
            } => {
                assert_eq!(EntityKind::from(kind), EntityKind::Grid);
                assert_eq!(entity, "UTMGrid");
                assert_eq!(start, vec![1, 1]);
                assert!(stride.is_empty());
                assert_eq!(edge, vec![2, 3]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_explicit_formats_skip_detection() {
        let missing = Path::new("/nonexistent/file.hdf");
        assert_eq!(resolve_generation(Format::He2, missing).unwrap(), Generation::Hdfeos2);
        assert!(resolve_generation(Format::Auto, missing).is_err());
    }
}
