//! Locating and loading the native shared libraries.
//!
//! Handles platform library naming (`lib{name}.so`, `lib{name}.dylib`,
//! `{name}.dll`) and search order: configured directories, the current
//! directory, then the platform library directories. When no candidate
//! file exists the name is handed to the system loader, which honours
//! `LD_LIBRARY_PATH` and the linker cache.

use std::path::{Path, PathBuf};

use libloading::Library;
use tracing::{debug, info};

use crate::config::LibraryConfig;
use crate::error::{LoadError, Result};

/// Short name of the HDF-EOS2 library.
pub const HDFEOS2_LIBRARY: &str = "hdfeos";

/// Short name of the HDF-EOS5 library.
pub const HDFEOS5_LIBRARY: &str = "he5_hdfeos";

/// Ordered list of directories to look for libraries in.
#[derive(Debug, Clone)]
pub struct LibrarySearch {
    search_paths: Vec<PathBuf>,
}

impl LibrarySearch {
    /// Search paths for `config`: its directories first, then the defaults.
    pub fn from_config(config: &LibraryConfig) -> Self {
        let mut search_paths = config.search_dirs.clone();
        if config.use_default_paths {
            search_paths.extend(default_search_paths());
        }
        Self { search_paths }
    }

    /// Search only the given directories.
    pub fn with_paths(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Find `name` in the search paths.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        for dir in &self.search_paths {
            for filename in candidate_filenames(name) {
                let path = dir.join(&filename);
                if path.is_file() {
                    debug!(library = name, path = %path.display(), "Resolved library");
                    return Some(path);
                }
            }
        }
        None
    }

    /// Load `name`, preferring an explicit path when one is configured.
    pub fn load(&self, explicit: Option<&Path>, name: &str) -> Result<(Library, PathBuf)> {
        if let Some(path) = explicit {
            return open_library(path).map(|lib| (lib, path.to_path_buf()));
        }

        if let Some(path) = self.resolve(name) {
            return open_library(&path).map(|lib| (lib, path));
        }

        // Leave the final say to the system loader.
        let filename = PathBuf::from(libloading::library_filename(name));
        debug!(library = name, "Falling back to the system library search");
        open_library(&filename)
            .map(|lib| (lib, filename))
            .map_err(|_| LoadError::LibraryNotFound {
                name: name.to_string(),
                searched: self.search_paths.clone(),
            })
    }
}

/// Platform library directories, current directory first.
pub fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    #[cfg(target_os = "linux")]
    {
        paths.push(PathBuf::from("/usr/lib"));
        paths.push(PathBuf::from("/usr/local/lib"));
        paths.push(PathBuf::from("/lib"));

        if cfg!(target_pointer_width = "64") {
            paths.push(PathBuf::from("/usr/lib64"));
            paths.push(PathBuf::from("/lib64"));
            paths.push(PathBuf::from("/usr/lib/x86_64-linux-gnu"));
        }
    }

    #[cfg(target_os = "macos")]
    {
        paths.push(PathBuf::from("/usr/lib"));
        paths.push(PathBuf::from("/usr/local/lib"));
        paths.push(PathBuf::from("/opt/homebrew/lib"));
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(system_root) = std::env::var("SystemRoot") {
            paths.push(PathBuf::from(format!("{}\\System32", system_root)));
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.insert(0, cwd);
    }

    paths
}

/// File names `name` may have on this platform, in priority order.
pub fn candidate_filenames(name: &str) -> Vec<String> {
    let extensions: &[&str] = if cfg!(target_os = "windows") {
        &["dll"]
    } else if cfg!(target_os = "macos") {
        &["dylib", "so"]
    } else {
        &["so"]
    };
    let prefixes: &[&str] = if cfg!(target_os = "windows") {
        &["", "lib"]
    } else {
        &["lib", ""]
    };

    let mut names = Vec::new();
    for prefix in prefixes {
        for ext in extensions {
            names.push(format!("{}{}.{}", prefix, name, ext));
        }
    }
    names
}

fn open_library(path: &Path) -> Result<Library> {
    // SAFETY: loading runs the library's initializers. The HDF-EOS
    // libraries have no initializers with preconditions on the caller.
    let library = unsafe { Library::new(path) }.map_err(|e| LoadError::load_failed(path, e))?;
    info!(path = %path.display(), "Loaded native library");
    Ok(library)
}
