//! Native HDF-EOS backends for `hdfeos-core`.
//!
//! The HDF-EOS2 (`libhdfeos`) and HDF-EOS5 (`libhe5_hdfeos`) libraries are
//! loaded at runtime with `libloading`, so the crate builds without either
//! one installed. Each backend implements [`hdfeos_core::NativeApi`] over a
//! table of entry points resolved at load time.
//!
//! ```ignore
//! use hdfeos_core::{list_entities, EntityKind};
//! use hdfeos_native::{load_backend, LibraryConfig};
//!
//! let api = load_backend(hdfeos_core::Generation::Hdfeos5, &LibraryConfig::from_env())?;
//! let swaths = list_entities(api.as_ref(), EntityKind::Swath, "SimpleSwath.h5")?;
//! ```

#[macro_use]
mod symbols;

pub mod config;
pub mod detect;
pub mod error;
pub mod he2;
pub mod he5;
pub mod loader;

pub use config::LibraryConfig;
pub use detect::detect_generation;
pub use error::{LoadError, Result};
pub use he2::Hdfeos2Library;
pub use he5::Hdfeos5Library;
pub use loader::{LibrarySearch, HDFEOS2_LIBRARY, HDFEOS5_LIBRARY};

use hdfeos_core::{Generation, NativeApi};

/// Load the backend for `generation`.
pub fn load_backend(generation: Generation, config: &LibraryConfig) -> Result<Box<dyn NativeApi>> {
    Ok(match generation {
        Generation::Hdfeos2 => Box::new(Hdfeos2Library::load(config)?),
        Generation::Hdfeos5 => Box::new(Hdfeos5Library::load(config)?),
    })
}
