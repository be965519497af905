//! Configuration for locating the native HDF-EOS libraries.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LoadError, Result};

/// Environment variable holding an explicit HDF-EOS2 library path.
pub const ENV_HDFEOS2_LIB: &str = "HDFEOS2_LIB";

/// Environment variable holding an explicit HDF-EOS5 library path.
pub const ENV_HDFEOS5_LIB: &str = "HDFEOS5_LIB";

/// Environment variable holding extra search directories
/// (platform path-list syntax, `:` on Unix).
pub const ENV_HDFEOS_LIB_DIR: &str = "HDFEOS_LIB_DIR";

/// Where to find `libhdfeos` and `libhe5_hdfeos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Explicit path to the HDF-EOS2 shared library.
    pub hdfeos2_lib: Option<PathBuf>,

    /// Explicit path to the HDF-EOS5 shared library.
    pub hdfeos5_lib: Option<PathBuf>,

    /// Directories searched before the defaults.
    pub search_dirs: Vec<PathBuf>,

    /// Also search the platform library directories.
    pub use_default_paths: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            hdfeos2_lib: None,
            hdfeos5_lib: None,
            search_dirs: Vec::new(),
            use_default_paths: true,
        }
    }
}

impl LibraryConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key).map(PathBuf::from))
    }

    /// Build a configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<PathBuf>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_HDFEOS2_LIB).filter(|p| !p.as_os_str().is_empty()) {
            config.hdfeos2_lib = Some(path);
        }

        if let Some(path) = lookup(ENV_HDFEOS5_LIB).filter(|p| !p.as_os_str().is_empty()) {
            config.hdfeos5_lib = Some(path);
        }

        if let Some(dirs) = lookup(ENV_HDFEOS_LIB_DIR) {
            config.search_dirs = std::env::split_paths(&dirs)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }

        config
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            LoadError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            LoadError::InvalidConfig(format!("cannot parse {}: {}", path.display(), e))
        })
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let explicit = [("hdfeos2_lib", &self.hdfeos2_lib), ("hdfeos5_lib", &self.hdfeos5_lib)];
        for (label, path) in explicit {
            if let Some(path) = path {
                if !path.is_file() {
                    return Err(format!("{} {} is not a file", label, path.display()));
                }
            }
        }

        if let Some(dir) = self.search_dirs.iter().find(|d| !d.is_dir()) {
            return Err(format!("search directory {} does not exist", dir.display()));
        }

        if !self.use_default_paths
            && self.search_dirs.is_empty()
            && self.hdfeos2_lib.is_none()
            && self.hdfeos5_lib.is_none()
        {
            return Err("no library path and no search directories configured".to_string());
        }

        Ok(())
    }

    /// Prefer explicit values from `other`, keeping ours where it has none.
    pub fn merge(mut self, other: LibraryConfig) -> Self {
        if other.hdfeos2_lib.is_some() {
            self.hdfeos2_lib = other.hdfeos2_lib;
        }
        if other.hdfeos5_lib.is_some() {
            self.hdfeos5_lib = other.hdfeos5_lib;
        }
        let mut dirs = other.search_dirs;
        for dir in self.search_dirs {
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        self.search_dirs = dirs;
        self.use_default_paths &= other.use_default_paths;
        self
    }
}
