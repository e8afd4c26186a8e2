//! Error types.
//!
//! Each module family has its own enum so callers can match on the failures
//! that are actually possible for the call they made:
//!
//! - [`FileError`]: the file cache and loaded-file line views
//! - [`FsError`]: the filesystem helpers in [`crate::fs`]
//! - [`RunfileError`]: runfile resolution in [`crate::test_support`]

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for file cache operations.
///
/// # Example
///
/// ```ignore
/// match filekit::new_from_data("fixture", b"a\nb".to_vec(), false) {
///     Ok(file) => { /* registered */ }
///     Err(FileError::KeyInUse { key }) => eprintln!("{key} already registered"),
///     Err(e) => eprintln!("{e}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum FileError {
    /// The path could not be made absolute.
    #[error("resolving {}: {source}", path.display())]
    Resolve {
        /// The path as given by the caller.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },

    /// Reading file metadata failed.
    #[error("stat {}: {source}", path.display())]
    Stat {
        /// The absolute path that failed.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },

    /// Reading file content failed.
    #[error("reading {}: {source}", path.display())]
    Read {
        /// The absolute path that failed.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },

    /// The key is already registered and overwriting was not requested.
    #[error("key {key:?} is already in use")]
    KeyInUse {
        /// The colliding key.
        key: String,
    },

    /// A line exceeds the scanner limit.
    #[error("scanning {key:?} line by line: line {line} is {len} bytes (max {max})")]
    LineTooLong {
        /// Key of the record being scanned.
        key: String,
        /// 1-based number of the offending line.
        line: usize,
        /// Length of the offending line in bytes.
        len: usize,
        /// The limit that was applied.
        max: usize,
    },

    /// A line is not valid UTF-8.
    #[error("scanning {key:?} line by line: line {line} is not valid UTF-8")]
    InvalidUtf8 {
        /// Key of the record being scanned.
        key: String,
        /// 1-based number of the offending line, 0 for whole-content decoding.
        line: usize,
    },
}

impl FileError {
    /// Check if this is a key collision.
    pub fn is_key_in_use(&self) -> bool {
        matches!(self, Self::KeyInUse { .. })
    }

    /// Get the filesystem path involved in this error, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Resolve { path, .. } | Self::Stat { path, .. } | Self::Read { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }
}

/// Error type for the filesystem helpers.
#[derive(Debug, Error)]
pub enum FsError {
    /// Opening a file for reading failed.
    #[error("opening {}: {source}", path.display())]
    Open {
        /// The path that failed.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },

    /// Creating or truncating a file failed.
    #[error("creating {}: {source}", path.display())]
    Create {
        /// The path that failed.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },

    /// Creating a directory (and its parents) failed.
    #[error("creating directory {}: {source}", path.display())]
    CreateDir {
        /// The directory that failed.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },

    /// Copying bytes between two files failed.
    #[error("copying data from {} to {}: {source}", src.display(), dst.display())]
    Copy {
        /// Source file.
        src: PathBuf,
        /// Destination file.
        dst: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },

    /// Flushing a file to disk failed.
    #[error("calling sync on {}: {source}", path.display())]
    Sync {
        /// The path that failed.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },

    /// Reading metadata failed for a reason other than the path missing.
    #[error("stating path {}: {source}", path.display())]
    Stat {
        /// The path that failed.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },

    /// The path does not exist.
    #[error("{}: file not found", path.display())]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Writing file content failed.
    #[error("rewriting {}: {source}", path.display())]
    Write {
        /// The path that failed.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },

    /// Removing a file failed.
    #[error("removing {}: {source}", path.display())]
    Remove {
        /// The path that failed.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },

    /// Walking a directory tree failed.
    #[error("walking {}: {source}", path.display())]
    Walk {
        /// Root of the walk.
        path: PathBuf,
        /// The underlying walk error.
        source: walkdir::Error,
    },
}

/// Error type for runfile resolution.
#[derive(Debug, Error)]
pub enum RunfileError {
    /// Runfile helpers were called outside of any test harness.
    #[error("runfile helpers should only be called for tests")]
    NotUnderTest,

    /// Neither a runfiles manifest nor a runfiles directory is advertised.
    #[error("no runfiles manifest or directory found in the environment")]
    NoRunfiles,

    /// The runfiles manifest could not be read.
    #[error("reading runfiles manifest {}: {source}", path.display())]
    Manifest {
        /// Manifest path.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },

    /// The runfiles directory could not be walked.
    #[error("walking runfiles directory {}: {source}", path.display())]
    Walk {
        /// Runfiles root.
        path: PathBuf,
        /// The underlying walk error.
        source: walkdir::Error,
    },

    /// No runfile matches the requested path.
    #[error("cannot find runfile {}", path.display())]
    NotFound {
        /// The requested path.
        path: PathBuf,
    },

    /// Listing a data directory failed.
    #[error("opening dir {}: {source}", path.display())]
    ReadDir {
        /// The directory that failed.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },

    /// Stating a candidate failed.
    #[error(transparent)]
    Fs(#[from] FsError),

    /// Loading the resolved runfile into the cache failed.
    #[error(transparent)]
    Load(#[from] FileError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_in_use_message() {
        let err = FileError::KeyInUse { key: "k".into() };
        assert!(err.is_key_in_use());
        assert_eq!(err.to_string(), r#"key "k" is already in use"#);
        assert!(err.path().is_none());
    }

    #[test]
    fn test_read_error_carries_path() {
        let err = FileError::Read {
            path: PathBuf::from("/tmp/missing.txt"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(err.path(), Some(Path::new("/tmp/missing.txt")));
        assert!(err.to_string().starts_with("reading /tmp/missing.txt"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_runfile_load_wraps_file_error() {
        let err: RunfileError = FileError::KeyInUse { key: "x".into() }.into();
        assert!(matches!(err, RunfileError::Load(FileError::KeyInUse { .. })));
        assert_eq!(err.to_string(), r#"key "x" is already in use"#);
    }
}
