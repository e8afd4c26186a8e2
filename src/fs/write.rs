//! Rewriting and deleting files.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::error::FsError;

/// Create or truncate `path` and write `content` with surrounding whitespace
/// trimmed.
pub fn rewrite_file(path: impl AsRef<Path>, content: &str) -> Result<(), FsError> {
    let path = path.as_ref();
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|source| FsError::Create {
            path: path.to_path_buf(),
            source,
        })?;

    file.write_all(content.trim().as_bytes())
        .map_err(|source| FsError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Remove `path`, treating an already-missing file as success.
pub fn delete_file(path: impl AsRef<Path>) -> Result<(), FsError> {
    let path = path.as_ref();
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(FsError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rewrite_file_truncates_and_trims() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("out.txt");
        fs::write(&path, "a much longer previous content").unwrap();

        rewrite_file(&path, "\n  new  \n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_rewrite_file_missing_dir() {
        let tmp = tempdir().unwrap();
        let err = rewrite_file(tmp.path().join("no/such/dir.txt"), "x").unwrap_err();
        assert!(matches!(err, FsError::Create { .. }));
    }

    #[test]
    fn test_delete_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("gone.txt");
        fs::write(&path, "x").unwrap();

        delete_file(&path).unwrap();
        assert!(!path.exists());
        // Second delete is a no-op.
        delete_file(&path).unwrap();
    }
}
