//! Common testing utilities.
//!
//! Locates test data ("runfiles") in a build-system agnostic way:
//!
//! ```text
//! runfile_path("pkg/testdata/in.txt")
//!   ├─► not under any test harness     → RunfileError::NotUnderTest
//!   ├─► bazel test                     → suffix match against list_runfiles()
//!   └─► cargo test / nextest           → the path itself, if it exists
//! ```
//!
//! Under Bazel, runfiles are listed from `RUNFILES_MANIFEST_FILE` when set
//! (one `short_path absolute_path` pair per line), otherwise by walking
//! `RUNFILES_DIR` or `TEST_SRCDIR`.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use walkdir::WalkDir;

use crate::error::RunfileError;
use crate::file::{self, LoadedFile};
use crate::fs::{require_file, stat_file, to_unix_path};
use crate::test_detection::{running_as_bazel_test, running_as_test};

/// Path of the runfiles manifest.
pub const RUNFILES_MANIFEST_ENV: &str = "RUNFILES_MANIFEST_FILE";
/// Root of the runfiles tree.
pub const RUNFILES_DIR_ENV: &str = "RUNFILES_DIR";
/// Legacy root of the runfiles tree for tests.
pub const TEST_SRCDIR_ENV: &str = "TEST_SRCDIR";
/// Per-test scratch directory provided by Bazel.
pub const TEST_TMPDIR_ENV: &str = "TEST_TMPDIR";

// =============================================================================
// Runfile Listing
// =============================================================================

/// One file made available to the test by the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runfile {
    /// Workspace-relative path, always with forward slashes.
    pub short_path: String,
    /// Location on disk.
    pub path: PathBuf,
}

/// List every runfile advertised by the environment.
pub fn list_runfiles() -> Result<Vec<Runfile>, RunfileError> {
    if let Some(manifest) = env::var_os(RUNFILES_MANIFEST_ENV).filter(|v| !v.is_empty()) {
        let manifest = PathBuf::from(manifest);
        let text = fs::read_to_string(&manifest).map_err(|source| RunfileError::Manifest {
            path: manifest.clone(),
            source,
        })?;
        return Ok(parse_manifest(&text));
    }

    let root = [RUNFILES_DIR_ENV, TEST_SRCDIR_ENV]
        .iter()
        .filter_map(|name| env::var_os(name))
        .find(|v| !v.is_empty())
        .ok_or(RunfileError::NoRunfiles)?;
    walk_runfiles(Path::new(&root))
}

/// Parse a runfiles manifest.
///
/// Entries without a target (empty files and directories) are skipped.
pub(crate) fn parse_manifest(text: &str) -> Vec<Runfile> {
    text.lines()
        .filter_map(|line| {
            let (short, target) = line.split_once(' ')?;
            (!short.is_empty() && !target.is_empty()).then(|| Runfile {
                short_path: to_unix_path(short),
                path: PathBuf::from(target),
            })
        })
        .collect()
}

fn walk_runfiles(root: &Path) -> Result<Vec<Runfile>, RunfileError> {
    let mut runfiles = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|source| RunfileError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(root) {
            runfiles.push(Runfile {
                short_path: to_unix_path(rel),
                path: entry.path().to_path_buf(),
            });
        }
    }
    Ok(runfiles)
}

/// First runfile whose location ends with `path`.
pub(crate) fn find_runfile<'a>(runfiles: &'a [Runfile], path: &Path) -> Option<&'a Runfile> {
    let wanted = to_unix_path(path);
    runfiles
        .iter()
        .find(|rf| to_unix_path(&rf.path).ends_with(&wanted))
}

// =============================================================================
// Resolution
// =============================================================================

/// Find a test data file, working under both Bazel and cargo.
pub fn runfile_path(path: impl AsRef<Path>) -> Result<PathBuf, RunfileError> {
    let path = path.as_ref();
    if !running_as_test() {
        return Err(RunfileError::NotUnderTest);
    }

    if running_as_bazel_test() {
        let runfiles = list_runfiles()?;
        let found = find_runfile(&runfiles, path).ok_or_else(|| RunfileError::NotFound {
            path: path.to_path_buf(),
        })?;
        tracing::debug!(
            path = %path.display(),
            resolved = %found.path.display(),
            "runfile resolved"
        );
        return Ok(found.path.clone());
    }

    resolve_plain(path)
}

fn resolve_plain(path: &Path) -> Result<PathBuf, RunfileError> {
    match stat_file(path)? {
        Some(_) => Ok(path.to_path_buf()),
        None => Err(RunfileError::NotFound {
            path: path.to_path_buf(),
        }),
    }
}

/// All runfiles associated with this test that live in `dir`.
///
/// Typical use is `runfiles("testdata")`. Only files are returned and the
/// plain-filesystem mode only looks one level deep.
pub fn runfiles(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, RunfileError> {
    let dir = dir.as_ref();
    if !running_as_test() {
        return Err(RunfileError::NotUnderTest);
    }

    let candidates = if running_as_bazel_test() {
        let wanted = to_unix_path(dir);
        list_runfiles()?
            .into_iter()
            .filter(|rf| rf.short_path.contains(&wanted))
            .map(|rf| rf.path)
            .collect()
    } else {
        list_dir(dir)?
    };

    files_only(candidates)
}

fn list_dir(dir: &Path) -> Result<Vec<PathBuf>, RunfileError> {
    let read_dir_err = |source| RunfileError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    fs::read_dir(dir)
        .map_err(read_dir_err)?
        .map(|entry| entry.map(|e| e.path()).map_err(read_dir_err))
        .collect()
}

fn files_only(candidates: Vec<PathBuf>) -> Result<Vec<PathBuf>, RunfileError> {
    let mut result = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !require_file(&candidate)?.is_dir() {
            result.push(candidate);
        }
    }
    Ok(result)
}

/// Read a runfile through the global file cache.
pub fn load_runfile(path: impl AsRef<Path>) -> Result<Arc<LoadedFile>, RunfileError> {
    let resolved = runfile_path(path)?;
    Ok(file::load_file(resolved)?)
}

// =============================================================================
// Temporary Directories
// =============================================================================

/// Base directory for test scratch space.
///
/// `TEST_TMPDIR` under Bazel, `None` (system default) otherwise.
pub fn test_tmp_base() -> Option<PathBuf> {
    if !running_as_bazel_test() {
        return None;
    }
    env::var_os(TEST_TMPDIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Create a temporary directory under [`test_tmp_base`].
pub fn test_temp_dir(prefix: &str) -> io::Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(prefix);
    match test_tmp_base() {
        Some(base) => builder.tempdir_in(base),
        None => builder.tempdir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runfile(short: &str, path: &str) -> Runfile {
        Runfile {
            short_path: short.into(),
            path: PathBuf::from(path),
        }
    }

    #[test]
    fn test_parse_manifest() {
        let text = "\
_main/pkg/testdata/a.txt /cache/exec/pkg/testdata/a.txt
_main/pkg/empty_dir
_main/pkg/testdata/b.txt /cache/exec/pkg/testdata/b.txt
";
        assert_eq!(
            parse_manifest(text),
            vec![
                runfile("_main/pkg/testdata/a.txt", "/cache/exec/pkg/testdata/a.txt"),
                runfile("_main/pkg/testdata/b.txt", "/cache/exec/pkg/testdata/b.txt"),
            ]
        );
    }

    #[test]
    fn test_find_runfile_suffix_match() {
        let files = vec![
            runfile("_main/other/in.txt", "/exec/other/in.txt"),
            runfile("_main/pkg/testdata/in.txt", "/exec/pkg/testdata/in.txt"),
        ];

        let found = find_runfile(&files, Path::new("pkg/testdata/in.txt")).unwrap();
        assert_eq!(found.path, PathBuf::from("/exec/pkg/testdata/in.txt"));

        // Ambiguous suffixes resolve to the first listed runfile.
        let found = find_runfile(&files, Path::new("in.txt")).unwrap();
        assert_eq!(found.path, PathBuf::from("/exec/other/in.txt"));

        assert!(find_runfile(&files, Path::new("missing.txt")).is_none());
    }

    #[test]
    fn test_find_runfile_backslash_spelling() {
        let files = vec![runfile("_main/pkg/in.txt", "/exec/pkg/in.txt")];
        assert!(find_runfile(&files, Path::new(r"pkg\in.txt")).is_some());
    }

    #[test]
    fn test_walk_runfiles() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("_main/pkg")).unwrap();
        fs::write(dir.path().join("_main/pkg/data.txt"), "x").unwrap();

        let files = walk_runfiles(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].short_path, "_main/pkg/data.txt");
        assert_eq!(files[0].path, dir.path().join("_main/pkg/data.txt"));
    }

    // The remaining tests assume a plain `cargo test` run, not `bazel test`.

    #[test]
    fn test_runfile_path_plain() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.txt");
        fs::write(&path, "x").unwrap();

        assert_eq!(runfile_path(&path).unwrap(), path);
        let err = runfile_path(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, RunfileError::NotFound { .. }));
    }

    #[test]
    fn test_runfiles_plain_skips_dirs() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();

        let mut found = runfiles(dir.path()).unwrap();
        found.sort();
        assert_eq!(
            found,
            vec![dir.path().join("a.txt"), dir.path().join("b.txt")]
        );

        let err = runfiles(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, RunfileError::ReadDir { .. }));
    }

    #[test]
    fn test_load_runfile() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fixture.txt");
        fs::write(&path, "line one\nline two\n").unwrap();

        let file = load_runfile(&path).unwrap();
        assert!(file.from_file());
        assert_eq!(&*file.lines().unwrap(), ["line one", "line two"]);
    }

    #[test]
    fn test_temp_dir_outside_bazel() {
        assert!(test_tmp_base().is_none());
        let dir = test_temp_dir("filekit-").unwrap();
        assert!(dir.path().is_dir());
        assert!(dir
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("filekit-"));
    }
}
