//! File and directory copying.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::FsError;

/// Options for [`copy_file_with`].
///
/// # Example
///
/// ```ignore
/// use filekit::fs::{copy_file_with, CopyOptions};
///
/// let options = CopyOptions::new().with_create_dst_dir(true).with_sync(true);
/// copy_file_with("in/a.txt", "out/nested/a.txt", &options)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOptions {
    /// Create the destination's parent directories when missing.
    pub create_dst_dir: bool,
    /// Permission bits for directories created by `create_dst_dir` (Unix only).
    pub dir_mode: u32,
    /// Flush the destination to disk before returning.
    pub sync: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            create_dst_dir: false,
            dir_mode: 0o755,
            sync: false,
        }
    }
}

impl CopyOptions {
    /// Create options with default settings.
    ///
    /// Default:
    /// - Create destination dir: disabled
    /// - Directory mode: `0o755`
    /// - Sync: disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to create the destination's parent directories.
    pub fn with_create_dst_dir(mut self, create: bool) -> Self {
        self.create_dst_dir = create;
        self
    }

    /// Set the mode used for created directories.
    pub fn with_dir_mode(mut self, mode: u32) -> Self {
        self.dir_mode = mode;
        self
    }

    /// Set whether to fsync the destination.
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }
}

/// Copy `src` to `dst` with default options.
///
/// `dst` is created or truncated. Returns the number of bytes copied.
pub fn copy_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<u64, FsError> {
    copy_file_with(src, dst, &CopyOptions::default())
}

/// Copy `src` to `dst`.
///
/// `dst` is created or truncated. Returns the number of bytes copied.
pub fn copy_file_with(
    src: impl AsRef<Path>,
    dst: impl AsRef<Path>,
    options: &CopyOptions,
) -> Result<u64, FsError> {
    let (src, dst) = (src.as_ref(), dst.as_ref());

    let mut src_file = File::open(src).map_err(|source| FsError::Open {
        path: src.to_path_buf(),
        source,
    })?;

    if options.create_dst_dir
        && let Some(dir) = dst.parent().filter(|dir| !dir.as_os_str().is_empty())
    {
        create_dir_all(dir, options.dir_mode).map_err(|source| FsError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let mut dst_file = File::create(dst).map_err(|source| FsError::Create {
        path: dst.to_path_buf(),
        source,
    })?;

    let copied = io::copy(&mut src_file, &mut dst_file).map_err(|source| FsError::Copy {
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
        source,
    })?;

    if options.sync {
        dst_file.sync_all().map_err(|source| FsError::Sync {
            path: dst.to_path_buf(),
            source,
        })?;
    }

    Ok(copied)
}

#[cfg(unix)]
fn create_dir_all(dir: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(mode).create(dir)
}

#[cfg(not(unix))]
fn create_dir_all(dir: &Path, _mode: u32) -> io::Result<()> {
    fs::create_dir_all(dir)
}

/// Copy every file below `from` to the same relative location below `to`.
///
/// Destination directories are created as needed. When `from` is a regular
/// file it is copied to `to` itself. With the `parallel` feature the copies
/// run on the rayon pool; the first failure is returned.
pub fn copy_dir_recursive(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<(), FsError> {
    let (from, to) = (from.as_ref(), to.as_ref());
    let files = collect_files(from)?;
    tracing::debug!(
        from = %from.display(),
        to = %to.display(),
        files = files.len(),
        "copying directory"
    );

    let options = CopyOptions::new().with_create_dst_dir(true);
    let copy_one =
        |rel: &PathBuf| copy_file_with(join_rel(from, rel), join_rel(to, rel), &options).map(drop);

    #[cfg(feature = "parallel")]
    let result = {
        use rayon::prelude::*;
        files.par_iter().try_for_each(copy_one)
    };

    #[cfg(not(feature = "parallel"))]
    let result = files.iter().try_for_each(copy_one);

    result
}

/// `base.join(rel)`, except that an empty `rel` names `base` itself.
fn join_rel(base: &Path, rel: &Path) -> PathBuf {
    if rel.as_os_str().is_empty() {
        base.to_path_buf()
    } else {
        base.join(rel)
    }
}

/// Relative paths of all non-directory entries below `root`.
///
/// A `root` that is itself a file yields one empty relative path.
fn collect_files(root: &Path) -> Result<Vec<PathBuf>, FsError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|source| FsError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(root) {
            files.push(rel.to_path_buf());
        }
    }
    Ok(files)
}
