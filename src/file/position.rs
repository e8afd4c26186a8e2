//! Positions inside loaded files.

use std::fmt;
use std::sync::Arc;

use super::loaded::LoadedFile;
use crate::error::FileError;

/// A single character position within a loaded file.
///
/// Holds a shared handle to the record, so the file always outlives the
/// position. Lines and columns are 1-based.
#[derive(Debug, Clone)]
pub struct LoadedFilePosition {
    file: Arc<LoadedFile>,
    line: usize,
    column: usize,
}

impl LoadedFilePosition {
    /// Create a position in `file`.
    pub fn new(file: Arc<LoadedFile>, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }

    /// The referenced file.
    pub fn file(&self) -> &Arc<LoadedFile> {
        &self.file
    }

    /// Key of the referenced file.
    pub fn key(&self) -> &str {
        self.file.key()
    }

    /// 1-based line number.
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Text of the referenced line, or `None` when out of range.
    pub fn line_text(&self) -> Result<Option<String>, FileError> {
        let lines = self.file.lines()?;
        Ok(self
            .line
            .checked_sub(1)
            .and_then(|idx| lines.get(idx))
            .cloned())
    }
}

impl PartialEq for LoadedFilePosition {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.file, &other.file)
            && self.line == other.line
            && self.column == other.column
    }
}

impl Eq for LoadedFilePosition {}

impl fmt::Display for LoadedFilePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.key(), self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::DEFAULT_MAX_LINE_LEN;

    fn file(data: &str) -> Arc<LoadedFile> {
        Arc::new(LoadedFile::from_memory(
            "fixture.txt".into(),
            data.as_bytes().to_vec(),
            DEFAULT_MAX_LINE_LEN,
        ))
    }

    #[test]
    fn test_line_text() {
        let f = file("first\nsecond\nthird");
        let pos = LoadedFilePosition::new(Arc::clone(&f), 2, 3);

        assert_eq!(pos.key(), "fixture.txt");
        assert_eq!(pos.line_text().unwrap().as_deref(), Some("second"));
        assert_eq!(pos.to_string(), "fixture.txt:2:3");
    }

    #[test]
    fn test_line_text_out_of_range() {
        let f = file("only");
        assert_eq!(LoadedFilePosition::new(Arc::clone(&f), 0, 1).line_text().unwrap(), None);
        assert_eq!(LoadedFilePosition::new(f, 2, 1).line_text().unwrap(), None);
    }

    #[test]
    fn test_position_outlives_other_handles() {
        let pos = LoadedFilePosition::new(file("kept\nalive"), 2, 1);
        assert_eq!(pos.line_text().unwrap().as_deref(), Some("alive"));
    }

    #[test]
    fn test_equality_is_by_record() {
        let a = file("x");
        let b = file("x");
        assert_eq!(
            LoadedFilePosition::new(Arc::clone(&a), 1, 1),
            LoadedFilePosition::new(Arc::clone(&a), 1, 1)
        );
        assert_ne!(
            LoadedFilePosition::new(a, 1, 1),
            LoadedFilePosition::new(b, 1, 1)
        );
    }
}
