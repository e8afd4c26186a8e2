//! Loaded file records and their lazy line view.
//!
//! ```text
//! LoadedFile (shared as Arc, immutable after construction)
//! ├── key, data, from_file, stat
//! └── lines: LineCell ── Mutex<Option<Arc<[String]>>>
//!                          None      → scan on next call
//!                          Some(arc) → returned as-is (same Arc)
//! ```

use std::fmt;
use std::fs::Metadata;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::FileError;

/// Default longest line accepted by the line scanner (64 KiB).
pub const DEFAULT_MAX_LINE_LEN: usize = 64 * 1024;

// =============================================================================
// FileStat - Metadata Snapshot
// =============================================================================

/// Filesystem metadata captured when a record was loaded from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    /// Size in bytes at load time.
    pub len: u64,
    /// Last modification time, when the platform reports one.
    pub modified: Option<DateTime<Utc>>,
    /// Permission bits. Synthesized from the read-only flag off Unix.
    pub mode: u32,
    /// Whether the file was read-only.
    pub readonly: bool,
}

impl FileStat {
    pub(crate) fn from_metadata(meta: &Metadata) -> Self {
        let readonly = meta.permissions().readonly();
        Self {
            len: meta.len(),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
            mode: permission_mode(meta, readonly),
            readonly,
        }
    }
}

#[cfg(unix)]
fn permission_mode(meta: &Metadata, _readonly: bool) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode()
}

#[cfg(not(unix))]
fn permission_mode(_meta: &Metadata, readonly: bool) -> u32 {
    if readonly { 0o444 } else { 0o644 }
}

// =============================================================================
// LineCell - Memoized Line View
// =============================================================================

/// Memoizes the line split of a record.
///
/// The scan runs under the cell's own lock, so concurrent callers never scan
/// twice. A failed scan stores nothing and the next call scans again.
#[derive(Default)]
struct LineCell {
    lines: Mutex<Option<Arc<[String]>>>,
    scans: AtomicUsize,
}

impl LineCell {
    fn get_or_scan(
        &self,
        scan: impl FnOnce() -> Result<Vec<String>, FileError>,
    ) -> Result<Arc<[String]>, FileError> {
        let mut slot = self.lines.lock();
        if let Some(lines) = slot.as_ref() {
            return Ok(Arc::clone(lines));
        }

        self.scans.fetch_add(1, Ordering::Relaxed);
        let lines: Arc<[String]> = scan()?.into();
        *slot = Some(Arc::clone(&lines));
        Ok(lines)
    }

    fn is_scanned(&self) -> bool {
        self.lines.lock().is_some()
    }
}

// =============================================================================
// LoadedFile
// =============================================================================

/// An immutable file payload plus its lazily derived line view.
///
/// Records are created by [`FileCache`](super::FileCache) and handed out as
/// `Arc<LoadedFile>`, so every holder of the same key sees the same record.
pub struct LoadedFile {
    key: String,
    data: Vec<u8>,
    from_file: bool,
    stat: Option<FileStat>,
    max_line_len: usize,
    lines: LineCell,
}

impl LoadedFile {
    /// Record read from disk.
    pub(crate) fn from_disk(
        key: String,
        data: Vec<u8>,
        stat: FileStat,
        max_line_len: usize,
    ) -> Self {
        Self {
            key,
            data,
            from_file: true,
            stat: Some(stat),
            max_line_len,
            lines: LineCell::default(),
        }
    }

    /// Record injected from an in-memory buffer.
    pub(crate) fn from_memory(key: String, data: Vec<u8>, max_line_len: usize) -> Self {
        Self {
            key,
            data,
            from_file: false,
            stat: None,
            max_line_len,
            lines: LineCell::default(),
        }
    }

    /// The cache key of this record.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The raw bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the record was populated from a filesystem read.
    pub fn from_file(&self) -> bool {
        self.from_file
    }

    /// The key as a path if the record was loaded from a file.
    ///
    /// Returns `None` for records injected from memory.
    pub fn path(&self) -> Option<&str> {
        self.from_file.then_some(self.key.as_str())
    }

    /// Metadata captured at load time. Only disk-backed records have one.
    pub fn stat(&self) -> Option<&FileStat> {
        self.stat.as_ref()
    }

    /// Decode the whole payload as UTF-8, stripping a BOM if present.
    pub fn text(&self) -> Result<&str, FileError> {
        let buf = self.data.strip_prefix(b"\xef\xbb\xbf").unwrap_or(&self.data);
        std::str::from_utf8(buf).map_err(|_| FileError::InvalidUtf8 {
            key: self.key.clone(),
            line: 0,
        })
    }

    /// Lazily split the content into lines.
    ///
    /// The first successful call scans the data; every later call returns
    /// the same `Arc`.
    pub fn lines(&self) -> Result<Arc<[String]>, FileError> {
        self.lines_with_limit(self.max_line_len)
    }

    /// Like [`lines`](Self::lines), with an explicit line length limit for
    /// this call. Has no effect once lines are memoized.
    pub fn lines_with_limit(&self, max_line_len: usize) -> Result<Arc<[String]>, FileError> {
        self.lines.get_or_scan(|| {
            tracing::trace!(key = %self.key, bytes = self.data.len(), "scanning lines");
            split_lines(&self.key, &self.data, max_line_len)
        })
    }

    /// Whether the line view has been computed.
    pub fn lines_scanned(&self) -> bool {
        self.lines.is_scanned()
    }

    #[cfg(test)]
    pub(crate) fn scan_count(&self) -> usize {
        self.lines.scans.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for LoadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedFile")
            .field("key", &self.key)
            .field("len", &self.data.len())
            .field("from_file", &self.from_file)
            .field("stat", &self.stat)
            .field("lines_scanned", &self.lines_scanned())
            .finish()
    }
}

/// Split on `\n`, dropping one trailing `\r` per line.
///
/// A final terminator does not produce an empty last line.
fn split_lines(key: &str, data: &[u8], max_line_len: usize) -> Result<Vec<String>, FileError> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let body = data.strip_suffix(b"\n").unwrap_or(data);
    body.split(|&b| b == b'\n')
        .enumerate()
        .map(|(idx, raw)| {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            if raw.len() > max_line_len {
                return Err(FileError::LineTooLong {
                    key: key.to_string(),
                    line: idx + 1,
                    len: raw.len(),
                    max: max_line_len,
                });
            }
            std::str::from_utf8(raw)
                .map(str::to_owned)
                .map_err(|_| FileError::InvalidUtf8 {
                    key: key.to_string(),
                    line: idx + 1,
                })
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn memory(data: &str) -> LoadedFile {
        LoadedFile::from_memory("mem".into(), data.as_bytes().to_vec(), DEFAULT_MAX_LINE_LEN)
    }

    #[test]
    fn test_lines_split() {
        assert_eq!(&*memory("a\nb\nc").lines().unwrap(), ["a", "b", "c"]);
    }

    #[test]
    fn test_lines_trailing_newline() {
        assert_eq!(&*memory("a\nb\n").lines().unwrap(), ["a", "b"]);
        assert_eq!(&*memory("a\n\n").lines().unwrap(), ["a", ""]);
        assert_eq!(&*memory("\n").lines().unwrap(), [""]);
    }

    #[test]
    fn test_lines_crlf() {
        assert_eq!(&*memory("a\r\nb\r\n").lines().unwrap(), ["a", "b"]);
        assert_eq!(&*memory("a\r\nb\r").lines().unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_lines_empty() {
        assert!(memory("").lines().unwrap().is_empty());
    }

    #[test]
    fn test_lines_memoized() {
        let file = memory("a\nb\nc");
        assert!(!file.lines_scanned());

        let first = file.lines().unwrap();
        let second = file.lines().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(file.scan_count(), 1);
        assert!(file.lines_scanned());
    }

    #[test]
    fn test_lines_failure_not_memoized() {
        let file = memory("short\nthis line is long\n");

        let err = file.lines_with_limit(8).unwrap_err();
        assert!(matches!(
            err,
            FileError::LineTooLong { line: 2, len: 17, max: 8, .. }
        ));
        assert!(!file.lines_scanned());

        // A later call may retry and succeed.
        assert_eq!(&*file.lines().unwrap(), ["short", "this line is long"]);
        assert_eq!(file.scan_count(), 2);
    }

    #[test]
    fn test_lines_default_limit() {
        let long = "x".repeat(DEFAULT_MAX_LINE_LEN + 1);
        assert!(matches!(
            memory(&long).lines(),
            Err(FileError::LineTooLong { line: 1, .. })
        ));
        let fits = "x".repeat(DEFAULT_MAX_LINE_LEN);
        assert_eq!(memory(&fits).lines().unwrap().len(), 1);
    }

    #[test]
    fn test_lines_invalid_utf8() {
        let file = LoadedFile::from_memory("bin".into(), b"ok\n\xff\xfe\n".to_vec(), 64);
        assert!(matches!(
            file.lines(),
            Err(FileError::InvalidUtf8 { line: 2, .. })
        ));
    }

    #[test]
    fn test_text_strips_bom() {
        let mut bytes = vec![0xef, 0xbb, 0xbf];
        bytes.extend_from_slice(b"Hello");
        let file = LoadedFile::from_memory("bom".into(), bytes, 64);
        assert_eq!(file.text().unwrap(), "Hello");
    }

    #[test]
    fn test_origin_accessors() {
        let file = memory("x");
        assert!(!file.from_file());
        assert_eq!(file.path(), None);
        assert!(file.stat().is_none());

        let stat = FileStat {
            len: 1,
            modified: None,
            mode: 0o644,
            readonly: false,
        };
        let file = LoadedFile::from_disk("/abs/x".into(), b"x".to_vec(), stat.clone(), 64);
        assert!(file.from_file());
        assert_eq!(file.path(), Some("/abs/x"));
        assert_eq!(file.stat(), Some(&stat));
    }
}
