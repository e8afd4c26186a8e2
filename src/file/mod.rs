//! In-memory file cache with lazy line views.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    File Access Flow                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  load_file(path) ──► key = absolute_path(path)              │
//! │  load_from_path(key, path, overwrite)                       │
//! │                    │                                        │
//! │                    ├─► cached record (same Arc)             │
//! │                    └─► stat + read ──► LoadedFile           │
//! │                                                             │
//! │  new_from_data(key, bytes, overwrite)                       │
//! │                    └─► in-memory LoadedFile (no stat)       │
//! │                                                             │
//! │  LoadedFile::lines() ──► scanned once, memoized             │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Caching
//!
//! One table per [`FileCache`]; the process-wide instance is
//! [`GLOBAL_FILE_CACHE`]. See [`cache`] for the bypass and overwrite rules.

mod cache;
mod loaded;
mod position;

pub use cache::{
    FileCache, GLOBAL_FILE_CACHE, global_file_cache, load_file, load_from_path, new_from_data,
    query_key,
};
pub use loaded::{DEFAULT_MAX_LINE_LEN, FileStat, LoadedFile};
pub use position::LoadedFilePosition;
