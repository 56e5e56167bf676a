use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::RagError;

/// Raw corpus text together with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub source: String,
}

impl Document {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
        }
    }

    /// Reads a UTF-8 corpus file. Whitespace-only files count as empty.
    pub fn load(path: &Path) -> Result<Self, RagError> {
        if !path.exists() {
            return Err(RagError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => RagError::FileNotFound(path.to_path_buf()),
            _ => RagError::io(path, e),
        })?;

        if content.trim().is_empty() {
            return Err(RagError::EmptyCorpus(path.to_path_buf()));
        }

        Ok(Self::new(content, path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_reads_content_and_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("total_data.txt");
        fs::write(&path, "Jaipur is the Pink City.").unwrap();

        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.content, "Jaipur is the Pink City.");
        assert!(doc.source.ends_with("total_data.txt"));
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = Document::load(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, RagError::FileNotFound(_)));
    }

    #[test]
    fn blank_file_is_empty_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        fs::write(&path, "  \n\n ").unwrap();
        assert!(matches!(
            Document::load(&path).unwrap_err(),
            RagError::EmptyCorpus(_)
        ));
    }

    #[test]
    fn invalid_utf8_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        fs::write(&path, [0xff, 0xfe, 0x41]).unwrap();
        assert!(matches!(
            Document::load(&path).unwrap_err(),
            RagError::Io { .. }
        ));
    }
}
