//! Ebook authoring toolkit.
//!
//! - [`converter`] imports `.txt`, `.md` and Word files into Markdown with
//!   frontmatter metadata and [`stats`].
//! - [`splice`] inserts dictated or imported text at a cursor.
//! - [`manuscript`] owns the chapter list and the active chapter;
//!   [`storage`] persists it.
//! - [`dictation`] and [`assistant`] adapt the speech recognizer and the AI
//!   service.

pub mod assistant;
pub mod config;
pub mod converter;
pub mod dictation;
pub mod docx_html;
pub mod docx_reader;
pub mod error;
pub mod format;
pub mod frontmatter;
pub mod manuscript;
pub mod markdown;
pub mod splice;
pub mod stats;
pub mod storage;
pub mod toc;

pub use converter::{import_document, import_path, ConversionResult, ImportOptions, SourceFile};
pub use error::ImportError;
pub use manuscript::{Chapter, Manuscript};
