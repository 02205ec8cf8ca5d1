use crate::docx_html;
use anyhow::{Context, Result};
use docx_rust::DocxFile;
use std::io::Cursor;

/// Document properties stored in the DOCX package (`docProps/core.xml`).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub author: Option<String>,
}

pub struct WordDocument {
    /// DocxFile owns the raw data; Docx borrows from it, so parse on demand.
    file: DocxFile,
}

impl WordDocument {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let file = DocxFile::from_reader(Cursor::new(bytes.to_vec()))
            .map_err(|e| anyhow::anyhow!("{}", e))
            .context("Not a readable DOCX package")?;
        Ok(Self { file })
    }

    fn parse(&self) -> Result<docx_rust::Docx<'_>> {
        self.file
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .context("Failed to parse DOCX content")
    }

    /// Render the document body as HTML
    pub fn to_html(&self) -> Result<String> {
        let docx = self.parse()?;
        Ok(docx_html::docx_to_html(&docx))
    }

    pub fn core_properties(&self) -> CoreProperties {
        let Ok(docx) = self.parse() else {
            return CoreProperties::default();
        };

        // Core comes in namespaced and non-namespaced variants with the same fields
        let (title, creator) = match &docx.core {
            Some(docx_rust::core::Core::CoreNamespace(c)) => (
                c.title.as_deref().map(|s| s.to_string()),
                c.creator.as_deref().map(|s| s.to_string()),
            ),
            Some(docx_rust::core::Core::CoreNoNamespace(c)) => (
                c.title.as_deref().map(|s| s.to_string()),
                c.creator.as_deref().map(|s| s.to_string()),
            ),
            None => (None, None),
        };

        CoreProperties {
            title: non_blank(title),
            author: non_blank(creator),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
