use serde::Serialize;

/// One ATX heading of a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocItem {
    pub id: String,
    pub level: u8,
    pub text: String,
}

/// ATX headings in document order, ignoring fenced code blocks.
pub fn table_of_contents(md: &str) -> Vec<TocItem> {
    let mut items = Vec::new();
    let mut in_fence = false;

    for line in md.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        if let Some((level, text)) = parse_heading(trimmed) {
            items.push(TocItem {
                id: slugify(&text),
                level,
                text,
            });
        }
    }

    items
}

fn parse_heading(line: &str) -> Option<(u8, String)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }

    let rest = &line[hashes..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }

    // Optional closing sequence: "## Title ##"
    let text = rest.trim().trim_end_matches('#').trim();
    if text.is_empty() {
        return None;
    }

    Some((hashes as u8, text.to_string()))
}

fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if (c.is_whitespace() || c == '-') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}
