//! Library discovery and backend loading without the native libraries.

use std::path::PathBuf;

use hdfeos_core::Generation;
use hdfeos_native::{load_backend, LibraryConfig, LibrarySearch, LoadError};

fn isolated_config(dir: &tempfile::TempDir) -> LibraryConfig {
    LibraryConfig {
        search_dirs: vec![dir.path().to_path_buf()],
        use_default_paths: false,
        ..Default::default()
    }
}

#[test]
fn test_explicit_path_that_is_not_a_library() {
    let dir = tempfile::tempdir().unwrap();
    let fake = dir.path().join("libhe5_hdfeos.so");
    std::fs::write(&fake, b"\x7fELF but truncated").unwrap();

    let config = LibraryConfig {
        hdfeos5_lib: Some(fake.clone()),
        ..isolated_config(&dir)
    };
    assert!(config.validate().is_ok());

    match load_backend(Generation::Hdfeos5, &config) {
        Err(LoadError::LoadFailed { path, .. }) => assert_eq!(path, fake),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("a truncated file must not load"),
    }
}

#[test]
#[cfg(target_os = "linux")]
fn test_search_directory_candidate_is_tried() {
    let dir = tempfile::tempdir().unwrap();
    let candidate = dir.path().join("libhdfeos.so");
    std::fs::write(&candidate, b"").unwrap();

    let search = LibrarySearch::from_config(&isolated_config(&dir));
    assert_eq!(search.resolve("hdfeos"), Some(candidate.clone()));

    match load_backend(Generation::Hdfeos2, &isolated_config(&dir)) {
        Err(LoadError::LoadFailed { path, .. }) => assert_eq!(path, candidate),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("an empty file must not load"),
    }
}

#[test]
fn test_errors_name_the_library() {
    let err = LoadError::symbol_not_found("he5_hdfeos", "HE5_SWinqmaps");
    assert_eq!(err.to_string(), "symbol HE5_SWinqmaps not found in he5_hdfeos");

    let err = LoadError::LibraryNotFound {
        name: "hdfeos".to_string(),
        searched: vec![PathBuf::from("/opt/eos")],
    };
    assert!(err.to_string().contains("hdfeos"));
}
