use crate::stats::{self, Statistics};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DELIMITER: &str = "---";

/// How to treat a frontmatter block that is opened but never closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontmatterMode {
    /// Every line after the opening delimiter is read as metadata.
    #[default]
    Lenient,
    /// An unterminated block is not frontmatter; the whole input is body.
    Strict,
}

/// Statistics summary attached to every import.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataStatistics {
    pub word_count: usize,
    pub reading_time: String,
}

impl From<&Statistics> for MetadataStatistics {
    fn from(stats: &Statistics) -> Self {
        Self {
            word_count: stats.word_count,
            reading_time: stats::format_reading_time(stats.reading_time_minutes),
        }
    }
}

/// Metadata produced by a single import call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    /// Frontmatter keys other than title/author/date, kept verbatim
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
    pub statistics: MetadataStatistics,
}

/// Body text with the frontmatter block removed, plus what it contained.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub content: String,
    pub metadata: DocumentMetadata,
}

pub fn extract_metadata(text: &str, mode: FrontmatterMode) -> Extracted {
    let mut fields = BTreeMap::new();
    let lines: Vec<&str> = text.split('\n').collect();

    let content = if lines[0].trim() == DELIMITER {
        match find_closing_delimiter(&lines) {
            Some(close) => {
                collect_fields(&lines[1..close], &mut fields);
                lines[close + 1..].join("\n")
            }
            None if mode == FrontmatterMode::Lenient => {
                log::debug!("frontmatter block is not closed, reading to end of input");
                collect_fields(&lines[1..], &mut fields);
                String::new()
            }
            None => text.to_string(),
        }
    } else {
        text.to_string()
    };

    let statistics = stats::calculate_statistics(&content);
    let metadata = DocumentMetadata {
        title: fields.remove("title"),
        author: fields.remove("author"),
        date: fields.remove("date"),
        extra: fields,
        statistics: MetadataStatistics::from(&statistics),
    };

    Extracted { content, metadata }
}

fn find_closing_delimiter(lines: &[&str]) -> Option<usize> {
    lines
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, line)| line.trim() == DELIMITER)
        .map(|(i, _)| i)
}

fn collect_fields(lines: &[&str], fields: &mut BTreeMap<String, String>) {
    for line in lines {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };

        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }

        let key = match key.to_lowercase().as_str() {
            known @ ("title" | "author" | "date") => known.to_string(),
            _ => key.to_string(),
        };
        fields.insert(key, value.to_string());
    }
}
