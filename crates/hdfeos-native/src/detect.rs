//! File format sniffing.
//!
//! HDF-EOS5 files are HDF5 files; HDF-EOS2 files are HDF4 files. The HDF5
//! signature may sit at offset 0 or at any power-of-two multiple of 512
//! (user block). The HDF4 signature is always at offset 0.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use hdfeos_core::Generation;
use tracing::debug;

/// HDF5 superblock signature.
pub const HDF5_SIGNATURE: [u8; 8] = [0x89, b'H', b'D', b'F', b'\r', b'\n', 0x1a, b'\n'];

/// HDF4 magic number.
pub const HDF4_SIGNATURE: [u8; 4] = [0x0e, 0x03, 0x13, 0x01];

/// Largest user block offset probed for the HDF5 signature.
const MAX_USER_BLOCK: u64 = 1 << 20;

/// Guess which HDF-EOS generation can read `path`.
///
/// Returns `Ok(None)` when the file carries neither signature.
pub fn detect_generation(path: &Path) -> io::Result<Option<Generation>> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();

    let mut head = [0u8; 8];
    let n = read_at(&mut file, 0, &mut head)?;
    if n >= HDF4_SIGNATURE.len() && head[..4] == HDF4_SIGNATURE {
        debug!(path = %path.display(), "Detected HDF4 signature");
        return Ok(Some(Generation::Hdfeos2));
    }
    if n == HDF5_SIGNATURE.len() && head == HDF5_SIGNATURE {
        debug!(path = %path.display(), "Detected HDF5 signature");
        return Ok(Some(Generation::Hdfeos5));
    }

    let mut offset = 512;
    while offset + HDF5_SIGNATURE.len() as u64 <= len && offset <= MAX_USER_BLOCK {
        let read = read_at(&mut file, offset, &mut head)?;
        if read == HDF5_SIGNATURE.len() && head == HDF5_SIGNATURE {
            debug!(path = %path.display(), offset, "Detected HDF5 signature after user block");
            return Ok(Some(Generation::Hdfeos5));
        }
        offset *= 2;
    }

    Ok(None)
}

fn read_at(file: &mut File, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
    file.seek(SeekFrom::Start(offset))?;
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn test_detect_hdf5() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = HDF5_SIGNATURE.to_vec();
        bytes.extend_from_slice(&[0; 64]);
        let path = write_file(&dir, "swath.he5", &bytes);

        assert_eq!(detect_generation(&path).unwrap(), Some(Generation::Hdfeos5));
    }

    #[test]
    fn test_detect_hdf5_after_user_block() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = vec![0u8; 1024];
        bytes.extend_from_slice(&HDF5_SIGNATURE);
        bytes.extend_from_slice(&[0; 64]);
        let path = write_file(&dir, "blocked.h5", &bytes);

        assert_eq!(detect_generation(&path).unwrap(), Some(Generation::Hdfeos5));
    }

    #[test]
    fn test_detect_hdf4() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "grid.hdf", &[0x0e, 0x03, 0x13, 0x01, 0x00, 0x6a]);

        assert_eq!(detect_generation(&path).unwrap(), Some(Generation::Hdfeos2));
    }

    #[test]
    fn test_unknown_and_short_files() {
        let dir = tempfile::tempdir().unwrap();
        let text = write_file(&dir, "notes.txt", b"plain text, not HDF");
        let empty = write_file(&dir, "empty.h5", b"");

        assert_eq!(detect_generation(&text).unwrap(), None);
        assert_eq!(detect_generation(&empty).unwrap(), None);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(detect_generation(&dir.path().join("absent.h5")).is_err());
    }
}
