//! Import failure taxonomy.
//!
//! Each format handler reports its own read failure so callers can tell a
//! bad text file from a Word document the DOCX reader could not decode.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImportError>;

#[derive(Debug, Error)]
pub enum ImportError {
    /// The file name has no extension to dispatch on.
    #[error("File has no extension")]
    MissingExtension,

    #[error("Unsupported file type: .{0}")]
    UnsupportedFileType(String),

    #[error("Failed to read text file: {0}")]
    TextReadFailed(String),

    #[error("Failed to read markdown file: {0}")]
    MarkdownReadFailed(String),

    #[error("Failed to convert Word document: {0}")]
    WordConversionFailed(String),
}
