//! Error types for loading the native HDF-EOS libraries.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for library loading.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Errors that can occur while locating and loading a native library.
#[derive(Error, Debug)]
pub enum LoadError {
    /// No candidate file exists and the system loader could not find one.
    #[error("library {name} not found (searched {searched:?})")]
    LibraryNotFound { name: String, searched: Vec<PathBuf> },

    /// The file exists but the dynamic loader rejected it.
    #[error("failed to load {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// The library does not export an entry point the backend needs.
    #[error("symbol {symbol} not found in {library}")]
    SymbolNotFound { library: String, symbol: String },

    /// Configuration is unusable.
    #[error("invalid library configuration: {0}")]
    InvalidConfig(String),
}

impl LoadError {
    pub fn load_failed(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::LoadFailed {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn symbol_not_found(library: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self::SymbolNotFound {
            library: library.into(),
            symbol: symbol.into(),
        }
    }
}
