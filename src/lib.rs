//! # filekit
//!
//! Small file helpers shared by tools and their tests:
//!
//! - **File cache**: process-wide, keyed by absolute path or caller-chosen key,
//!   with lazily memoized line views
//! - **Filesystem helpers**: copy, recursive copy, stat, rewrite, delete
//! - **Test detection**: is this process running under `bazel test`,
//!   `cargo test` or nextest
//! - **Runfiles**: locate test data under Bazel and cargo alike
//!
//! ## Quick Start
//!
//! ```ignore
//! use filekit::{load_file, new_from_data};
//!
//! // Load once, reuse everywhere
//! let file = load_file("config/settings.txt")?;
//! for line in file.lines()?.iter() {
//!     println!("{line}");
//! }
//!
//! // Register an in-memory fixture under its own key
//! let fixture = new_from_data("fixture:empty", "", false)?;
//! assert_eq!(fixture.path(), None);
//! ```
//!
//! ## Bypass Mode
//!
//! Under a test harness the global cache does not retain records, so every
//! load re-reads the filesystem and tests cannot observe each other's
//! fixtures. Override with [`ConfigBuilder`] before first use:
//!
//! ```ignore
//! filekit::ConfigBuilder::new().bypass_cache(false).init();
//! ```
//!
//! ## Modules
//!
//! - [`mod@file`]: File cache, loaded files and positions
//! - [`fs`]: Filesystem convenience wrappers
//! - [`test_detection`]: Test harness detection
//! - [`test_support`]: Runfile resolution and test scratch directories
//! - [`config`]: Runtime configuration
//! - [`error`]: Error types

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod file;
pub mod fs;
pub mod test_detection;
pub mod test_support;

// =============================================================================
// Prelude - import commonly used items with a single `use`
// =============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use filekit::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        FileCache, FileError, LoadedFile, LoadedFilePosition, load_file, load_from_path,
        new_from_data, query_key,
    };

    pub use crate::{running_as_bazel_test, running_as_test};

    pub use crate::{load_runfile, runfile_path, runfiles};
}

// =============================================================================
// File Cache
// =============================================================================

pub use file::{
    DEFAULT_MAX_LINE_LEN, FileCache, FileStat, GLOBAL_FILE_CACHE, LoadedFile, LoadedFilePosition,
    global_file_cache, load_file, load_from_path, new_from_data, query_key,
};

// =============================================================================
// Infrastructure
// =============================================================================

pub use config::{Config, ConfigBuilder};
pub use error::{FileError, FsError, RunfileError};
pub use test_detection::{running_as_bazel_test, running_as_test};
pub use test_support::{
    Runfile, list_runfiles, load_runfile, runfile_path, runfiles, test_temp_dir, test_tmp_base,
};
