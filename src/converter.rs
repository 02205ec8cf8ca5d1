//! Document import pipeline.
//!
//! `convert` detects the format from the file name, hands the bytes to the
//! matching handler, then runs frontmatter extraction and statistics on the
//! markdown it produced. `import_document` wraps it so callers always get a
//! [`ConversionResult`] value back instead of an error.

use crate::docx_reader::WordDocument;
use crate::error::{ImportError, Result};
use crate::format::DocumentFormat;
use crate::frontmatter::{self, DocumentMetadata, FrontmatterMode};
use crate::markdown;
use serde::Serialize;
use std::path::Path;

/// A named file as handed over by the user: the name drives format detection.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk; the name is the final path component.
    pub async fn open(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, bytes })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    pub frontmatter: FrontmatterMode,
}

/// Markdown body plus the metadata found while importing it.
#[derive(Debug, Clone, Serialize)]
pub struct ImportedDocument {
    pub content: String,
    pub metadata: DocumentMetadata,
}

/// Outcome of an import; never both content and error.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ConversionResult {
    Content(ImportedDocument),
    Error { error: String },
}

impl ConversionResult {
    pub fn is_error(&self) -> bool {
        matches!(self, ConversionResult::Error { .. })
    }

    pub fn into_result(self) -> std::result::Result<ImportedDocument, String> {
        match self {
            ConversionResult::Content(doc) => Ok(doc),
            ConversionResult::Error { error } => Err(error),
        }
    }
}

impl From<Result<ImportedDocument>> for ConversionResult {
    fn from(result: Result<ImportedDocument>) -> Self {
        match result {
            Ok(doc) => ConversionResult::Content(doc),
            Err(e) => {
                log::error!("Conversion error: {}", e);
                ConversionResult::Error {
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Import an in-memory file. Failures come back as [`ConversionResult::Error`].
pub fn import_document(file: &SourceFile, options: &ImportOptions) -> ConversionResult {
    convert(file, options).into()
}

/// Read `path` and import it. A read failure is reported with the error of
/// the format the file name selects.
pub async fn import_path(path: &Path, options: &ImportOptions) -> ConversionResult {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let result = match DocumentFormat::from_file_name(&name) {
        Ok(format) => match SourceFile::open(path).await {
            Ok(file) => convert(&file, options),
            Err(e) => Err(read_failure(format, &e.to_string())),
        },
        Err(e) => Err(e),
    };

    result.into()
}

/// Fallible core of the pipeline: detect, convert, extract metadata.
pub fn convert(file: &SourceFile, options: &ImportOptions) -> Result<ImportedDocument> {
    let format = DocumentFormat::from_file_name(&file.name)?;
    log::debug!("importing {} as {}", file.name, format);

    match format {
        DocumentFormat::Text | DocumentFormat::Markdown => {
            let text = decode_text(&file.bytes).map_err(|e| read_failure(format, &e))?;
            let extracted = frontmatter::extract_metadata(&text, options.frontmatter);
            Ok(ImportedDocument {
                content: extracted.content,
                metadata: extracted.metadata,
            })
        }
        DocumentFormat::Word => convert_word(&file.bytes, options),
    }
}

fn convert_word(bytes: &[u8], options: &ImportOptions) -> Result<ImportedDocument> {
    let word_failure = |e: anyhow::Error| ImportError::WordConversionFailed(format!("{:#}", e));

    let document = WordDocument::from_bytes(bytes).map_err(word_failure)?;
    let html = document.to_html().map_err(word_failure)?;
    let md = markdown::html_to_markdown(&html);

    let mut extracted = frontmatter::extract_metadata(&md, options.frontmatter);

    // Frontmatter wins; package properties only fill gaps
    let properties = document.core_properties();
    let metadata = &mut extracted.metadata;
    if metadata.title.is_none() {
        metadata.title = properties.title;
    }
    if metadata.author.is_none() {
        metadata.author = properties.author;
    }

    Ok(ImportedDocument {
        content: extracted.content,
        metadata: extracted.metadata,
    })
}

fn decode_text(bytes: &[u8]) -> std::result::Result<String, String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string())
}

fn read_failure(format: DocumentFormat, reason: &str) -> ImportError {
    match format {
        DocumentFormat::Text => ImportError::TextReadFailed(reason.to_string()),
        DocumentFormat::Markdown => ImportError::MarkdownReadFailed(reason.to_string()),
        DocumentFormat::Word => ImportError::WordConversionFailed(reason.to_string()),
    }
}
