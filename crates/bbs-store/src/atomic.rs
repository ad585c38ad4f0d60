//! Temp-then-rename file replacement.
//!
//! Every write goes to a sibling temp file, is fsynced, then renamed over
//! the target. A reader sees either the old bytes or the new bytes, never a
//! mix. If any step fails the original file is untouched and the temp file
//! is removed when dropped.

use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::StoreError;

/// Replace `path` with `bytes`, creating parent directories as needed.
pub(crate) fn write(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let dir = path
        .parent()
        .ok_or_else(|| StoreError::InvalidKey(path.display().to_string()))?;
    fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    tmp.write_all(bytes)
        .map_err(|e| StoreError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| StoreError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| StoreError::io(path, e.error))?;
    Ok(())
}

/// Read `path`, treating a missing file as empty.
pub(crate) fn read_or_empty(path: &Path) -> Result<Vec<u8>, StoreError> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

/// The last `n` bytes of `path`, read after a seek. Missing reads as empty.
pub(crate) fn read_tail(path: &Path, n: usize) -> Result<Vec<u8>, StoreError> {
    let mut file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    let len = file.metadata().map_err(|e| StoreError::io(path, e))?.len();
    let start = len.saturating_sub(n as u64);
    file.seek(SeekFrom::Start(start))
        .map_err(|e| StoreError::io(path, e))?;
    let mut tail = Vec::with_capacity(usize::try_from(len - start).unwrap_or(n));
    file.read_to_end(&mut tail)
        .map_err(|e| StoreError::io(path, e))?;
    Ok(tail)
}

/// Remove `path`, treating a missing file as already removed.
pub(crate) fn remove(path: &Path) -> Result<bool, StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_tail_seeks_past_the_head() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("big.dat");
        let mut bytes = vec![b'x'; 1 << 20];
        bytes.extend_from_slice(b"0123456789ABCDEF");
        write(&path, &bytes).unwrap();

        assert_eq!(read_tail(&path, 16).unwrap(), b"0123456789ABCDEF");
        assert_eq!(read_tail(&path, 17).unwrap(), b"x0123456789ABCDEF");
        assert_eq!(read_tail(&path, 0).unwrap(), b"");
        assert!(read_tail(&tmp.path().join("missing.dat"), 16).unwrap().is_empty());
    }

    #[test]
    fn write_creates_parents_and_replaces() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("a").join("b").join("file.dat");

        write(&path, b"first").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"first");

        write(&path, b"second, longer").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second, longer");

        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1, "temp files must not survive a write");
    }

    #[test]
    fn missing_file_reads_empty_and_removes_quietly() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nothing");
        assert!(read_or_empty(&path).unwrap().is_empty());
        assert!(!remove(&path).unwrap());
    }
}
