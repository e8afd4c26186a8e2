//! Path utilities.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Standardize a path spelling to use forward slashes.
///
/// Makes paths compare uniformly between Windows and Unix.
pub fn to_unix_path(path: impl AsRef<Path>) -> String {
    path.as_ref().to_string_lossy().replace('\\', "/")
}

/// Make `path` absolute and lexically clean.
///
/// Relative paths are joined onto the current directory. `.` components are
/// dropped and `..` folds the preceding component. Symlinks are not resolved
/// and the path does not need to exist.
pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(clean_path(&joined))
}

/// Lexically normalize a path without touching the filesystem.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` stays at the root
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_unix_path() {
        assert_eq!(to_unix_path(r"a\b\c.txt"), "a/b/c.txt");
        assert_eq!(to_unix_path("a/b"), "a/b");
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(clean_path(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(clean_path(Path::new("../a/b/..")), PathBuf::from("../a"));
        assert_eq!(clean_path(Path::new("./")), PathBuf::from("."));
    }

    #[test]
    fn test_absolute_path_collapses_spellings() {
        let a = absolute_path(Path::new("data/file.txt")).unwrap();
        let b = absolute_path(Path::new("./data/../data/file.txt")).unwrap();
        assert!(a.is_absolute());
        assert_eq!(a, b);
    }

    #[test]
    fn test_absolute_path_keeps_absolute() {
        let root = std::env::temp_dir();
        let got = absolute_path(&root.join("x").join("..").join("y")).unwrap();
        assert_eq!(got, clean_path(&root).join("y"));
    }
}
