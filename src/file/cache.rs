//! Keyed file cache with at-most-one record per key.
//!
//! # Caching Strategy
//!
//! ```text
//! GLOBAL_FILE_CACHE (shared across the whole process)
//! └── RwLock<FxHashMap<String, Arc<LoadedFile>>>
//!     ├── "/abs/path/a.txt"  ← load_file / load_from_path (from_file = true)
//!     └── "fixture:b"        ← new_from_data              (from_file = false)
//!
//! Load Flow (load_from_path):
//! 1. !bypass && !overwrite && key present → return cached Arc (no I/O)
//! 2. absolute path → stat → read          (no lock held)
//! 3. bypass    → return fresh record, table untouched
//!    overwrite → insert, replacing
//!    otherwise → insert unless a concurrent loader won; return the winner
//! ```
//!
//! # Bypass Mode
//!
//! A bypassing cache never reads or writes its table, so every load re-reads
//! the filesystem and injected keys never collide. The global instance
//! bypasses under test harnesses unless [`crate::config`] says otherwise.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::loaded::{DEFAULT_MAX_LINE_LEN, FileStat, LoadedFile};
use super::position::LoadedFilePosition;
use crate::config::{self, Config};
use crate::error::FileError;
use crate::fs::absolute_path;

// =============================================================================
// Global File Cache
// =============================================================================

/// Global shared file cache, built from [`config::get`] on first use.
pub static GLOBAL_FILE_CACHE: LazyLock<FileCache> =
    LazyLock::new(|| FileCache::from_config(config::get()));

/// Get the global file cache.
pub fn global_file_cache() -> &'static FileCache {
    &GLOBAL_FILE_CACHE
}

/// Load `path` through the global cache, keyed by its absolute path.
pub fn load_file(path: impl AsRef<Path>) -> Result<Arc<LoadedFile>, FileError> {
    GLOBAL_FILE_CACHE.load_file(path)
}

/// Load `path` through the global cache under an explicit key.
pub fn load_from_path(
    key: impl Into<String>,
    path: impl AsRef<Path>,
    overwrite: bool,
) -> Result<Arc<LoadedFile>, FileError> {
    GLOBAL_FILE_CACHE.load_from_path(key, path, overwrite)
}

/// Register in-memory content in the global cache.
pub fn new_from_data(
    key: impl Into<String>,
    data: impl Into<Vec<u8>>,
    overwrite: bool,
) -> Result<Arc<LoadedFile>, FileError> {
    GLOBAL_FILE_CACHE.new_from_data(key, data, overwrite)
}

/// Look up a key in the global cache.
pub fn query_key(key: &str) -> Option<Arc<LoadedFile>> {
    GLOBAL_FILE_CACHE.query_key(key)
}

// =============================================================================
// FileCache
// =============================================================================

/// A table from keys to loaded file records.
///
/// The table lock is only held while touching the map, never across
/// filesystem I/O.
pub struct FileCache {
    files: RwLock<FxHashMap<String, Arc<LoadedFile>>>,
    bypass: bool,
    max_line_len: usize,
}

impl Default for FileCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FileCache {
    /// Create an empty caching instance.
    pub fn new() -> Self {
        Self::with_options(false, DEFAULT_MAX_LINE_LEN)
    }

    /// Create an instance that never retains records.
    pub fn bypassing() -> Self {
        Self::with_options(true, DEFAULT_MAX_LINE_LEN)
    }

    /// Create an instance from a configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::with_options(config.bypass(), config.max_line_len)
    }

    fn with_options(bypass: bool, max_line_len: usize) -> Self {
        Self {
            files: RwLock::new(FxHashMap::default()),
            bypass,
            max_line_len,
        }
    }

    /// Whether this cache skips its table.
    pub fn is_bypassing(&self) -> bool {
        self.bypass
    }

    /// Check whether `key` has already been loaded.
    ///
    /// Always `None` in bypass mode.
    pub fn query_key(&self, key: &str) -> Option<Arc<LoadedFile>> {
        if self.bypass {
            return None;
        }
        self.files.read().get(key).cloned()
    }

    /// Load `path`, keyed by its absolute, lexically cleaned form.
    ///
    /// Different relative spellings of the same file share one record.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Arc<LoadedFile>, FileError> {
        let path = path.as_ref();
        let abs = resolve(path)?;
        let key = path_key(path, &abs)?;
        if let Some(file) = self.cached(&key, false) {
            return Ok(file);
        }
        self.read_and_store(key, &abs, false)
    }

    /// Load `path` under an explicit `key`.
    ///
    /// Unless bypassing or `overwrite` is set, an existing record for `key`
    /// is returned without touching the filesystem. The caller is responsible
    /// for keeping explicit keys consistent with the paths they name.
    pub fn load_from_path(
        &self,
        key: impl Into<String>,
        path: impl AsRef<Path>,
        overwrite: bool,
    ) -> Result<Arc<LoadedFile>, FileError> {
        let key = key.into();
        if let Some(file) = self.cached(&key, overwrite) {
            return Ok(file);
        }
        let abs = resolve(path.as_ref())?;
        self.read_and_store(key, &abs, overwrite)
    }

    /// The stored record, unless the caller asked to overwrite it.
    fn cached(&self, key: &str, overwrite: bool) -> Option<Arc<LoadedFile>> {
        if overwrite {
            return None;
        }
        let file = self.query_key(key)?;
        tracing::debug!(key, "file cache hit");
        Some(file)
    }

    fn read_and_store(
        &self,
        key: String,
        abs: &Path,
        overwrite: bool,
    ) -> Result<Arc<LoadedFile>, FileError> {
        let meta = fs::metadata(abs).map_err(|source| FileError::Stat {
            path: abs.to_path_buf(),
            source,
        })?;
        let data = fs::read(abs).map_err(|source| FileError::Read {
            path: abs.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            %key,
            path = %abs.display(),
            bytes = data.len(),
            "file cache miss"
        );

        let stat = FileStat::from_metadata(&meta);
        let file = LoadedFile::from_disk(key, data, stat, self.max_line_len);
        Ok(self.store(file, overwrite))
    }

    /// Register in-memory content under `key`.
    ///
    /// Fails with [`FileError::KeyInUse`] when the key is taken and
    /// `overwrite` is false (never in bypass mode). Mostly used to register
    /// test fixtures under the same addressing scheme as real files.
    pub fn new_from_data(
        &self,
        key: impl Into<String>,
        data: impl Into<Vec<u8>>,
        overwrite: bool,
    ) -> Result<Arc<LoadedFile>, FileError> {
        let file = LoadedFile::from_memory(key.into(), data.into(), self.max_line_len);
        if self.bypass {
            tracing::trace!(key = file.key(), "file cache bypassed");
            return Ok(Arc::new(file));
        }

        let mut files = self.files.write();
        if !overwrite && files.contains_key(file.key()) {
            return Err(FileError::KeyInUse {
                key: file.key().to_string(),
            });
        }

        let file = Arc::new(file);
        if files.insert(file.key().to_string(), Arc::clone(&file)).is_some() {
            tracing::debug!(key = file.key(), "file cache entry overwritten");
        }
        Ok(file)
    }

    /// Insert a freshly read record according to the bypass/overwrite policy.
    fn store(&self, file: LoadedFile, overwrite: bool) -> Arc<LoadedFile> {
        let file = Arc::new(file);
        if self.bypass {
            tracing::trace!(key = file.key(), "file cache bypassed");
            return file;
        }

        let mut files = self.files.write();
        if overwrite {
            files.insert(file.key().to_string(), Arc::clone(&file));
            return file;
        }

        // A concurrent loader may have inserted while we were reading.
        Arc::clone(
            files
                .entry(file.key().to_string())
                .or_insert_with(|| Arc::clone(&file)),
        )
    }

    /// Build a position in the record stored under `key`.
    pub fn position(&self, key: &str, line: usize, column: usize) -> Option<LoadedFilePosition> {
        self.query_key(key)
            .map(|file| LoadedFilePosition::new(file, line, column))
    }

    /// Number of records in the table.
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// Whether the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }

    /// All keys currently stored, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.files.read().keys().cloned().collect()
    }
}

fn resolve(path: &Path) -> Result<PathBuf, FileError> {
    absolute_path(path).map_err(|source| FileError::Resolve {
        path: path.to_path_buf(),
        source,
    })
}

/// Keys must name exactly one file, so paths that are not valid UTF-8 are
/// rejected rather than lossily converted.
fn path_key(path: &Path, abs: &Path) -> Result<String, FileError> {
    abs.to_str()
        .map(str::to_owned)
        .ok_or_else(|| FileError::Resolve {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidData, "path is not valid UTF-8"),
        })
}

// =============================================================================
// Tests
// =============================================================================
