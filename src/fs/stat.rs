//! Metadata lookups.

use std::fs::{self, Metadata};
use std::io;
use std::path::Path;

use crate::error::FsError;

/// Check whether `path` exists and is a directory (not another type of file).
///
/// A missing path is `Ok(false)`; any other stat failure is an error.
pub fn dir_exists(path: impl AsRef<Path>) -> Result<bool, FsError> {
    Ok(stat_file(path)?.is_some_and(|meta| meta.is_dir()))
}

/// Stat `path`, mapping "not found" to `Ok(None)`.
pub fn stat_file(path: impl AsRef<Path>) -> Result<Option<Metadata>, FsError> {
    let path = path.as_ref();
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(FsError::Stat {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Stat `path`, treating a missing file as an error.
///
/// Useful when the caller does not care whether stat failed or the file
/// was absent.
pub fn require_file(path: impl AsRef<Path>) -> Result<Metadata, FsError> {
    let path = path.as_ref();
    stat_file(path)?.ok_or_else(|| FsError::NotFound {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_dir_exists() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("a.txt");
        fs::write(&file, b"hello").unwrap();

        assert!(dir_exists(tmp.path()).unwrap());
        assert!(!dir_exists(&file).unwrap());
        assert!(!dir_exists(tmp.path().join("missing")).unwrap());
    }

    #[test]
    fn test_stat_file_missing_is_none() {
        let tmp = tempdir().unwrap();
        assert!(stat_file(tmp.path().join("nope")).unwrap().is_none());

        let file = tmp.path().join("a.txt");
        fs::write(&file, b"hello").unwrap();
        assert_eq!(stat_file(&file).unwrap().unwrap().len(), 5);
    }

    #[test]
    fn test_require_file() {
        let tmp = tempdir().unwrap();
        let missing = tmp.path().join("nope");
        let err = require_file(&missing).unwrap_err();
        assert!(matches!(err, FsError::NotFound { path } if path == missing));
        assert!(require_file(tmp.path()).unwrap().is_dir());
    }
}
