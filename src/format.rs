use crate::error::{ImportError, Result};
use std::fmt;

/// Input formats the import pipeline understands, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Text,
    Markdown,
    Word,
}

impl DocumentFormat {
    /// Pick the format from the lowercased extension of `file_name`.
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = match file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext.to_lowercase(),
            _ => return Err(ImportError::MissingExtension),
        };

        match extension.as_str() {
            "txt" => Ok(Self::Text),
            "md" => Ok(Self::Markdown),
            "doc" | "docx" => Ok(Self::Word),
            _ => Err(ImportError::UnsupportedFileType(extension)),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "plain text",
            Self::Markdown => "markdown",
            Self::Word => "Word",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_known_extensions_case_insensitively() {
        assert_eq!(
            DocumentFormat::from_file_name("a.txt").unwrap(),
            DocumentFormat::Text
        );
        assert_eq!(
            DocumentFormat::from_file_name("Notes.MD").unwrap(),
            DocumentFormat::Markdown
        );
        assert_eq!(
            DocumentFormat::from_file_name("draft.v2.DocX").unwrap(),
            DocumentFormat::Word
        );
        assert_eq!(
            DocumentFormat::from_file_name("old.doc").unwrap(),
            DocumentFormat::Word
        );
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = DocumentFormat::from_file_name("notes.xyz").unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFileType(ref ext) if ext == "xyz"));
    }

    #[test]
    fn missing_extension() {
        assert!(matches!(
            DocumentFormat::from_file_name("notes"),
            Err(ImportError::MissingExtension)
        ));
        assert!(matches!(
            DocumentFormat::from_file_name("notes."),
            Err(ImportError::MissingExtension)
        ));
    }
}
