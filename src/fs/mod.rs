//! Filesystem convenience wrappers.
//!
//! Thin helpers over `std::fs` that attach the offending path to every
//! error ([`FsError`](crate::error::FsError)) and smooth over the common
//! "missing is fine" cases.

mod copy;
mod path;
mod stat;
mod write;

pub use copy::{CopyOptions, copy_dir_recursive, copy_file, copy_file_with};
pub use path::{absolute_path, clean_path, to_unix_path};
pub use stat::{dir_exists, require_file, stat_file};
pub use write::{delete_file, rewrite_file};
