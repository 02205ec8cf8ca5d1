use crate::docx_html::escape_html;
use scraper::{ElementRef, Html};

const CONTAINER_TAGS: &[&str] = &[
    "article", "aside", "body", "div", "footer", "header", "main", "section",
];

const BLOCK_TAGS: &[&str] = &[
    "blockquote", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "ol", "p", "pre", "table", "ul",
];

/// Convert an HTML fragment to markdown with `#` headings and `-` bullets.
///
/// Block elements are rendered one at a time and separated by a blank line;
/// html2md only ever sees inline content.
pub fn html_to_markdown(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut blocks = Vec::new();
    collect_blocks(fragment.root_element(), &mut blocks);
    clean_markdown(&blocks.join("\n\n"))
}

fn collect_blocks(parent: ElementRef<'_>, blocks: &mut Vec<String>) {
    let mut inline = String::new();

    for node in parent.children() {
        let Some(element) = ElementRef::wrap(node) else {
            if let Some(text) = node.value().as_text() {
                inline.push_str(&escape_html(text));
            }
            continue;
        };

        let name = element.value().name();
        let is_container = CONTAINER_TAGS.contains(&name);
        if !is_container && !BLOCK_TAGS.contains(&name) {
            inline.push_str(&element.html());
            continue;
        }

        push_block(blocks, paragraph(&inline));
        inline.clear();

        if is_container {
            collect_blocks(element, blocks);
        } else {
            push_block(blocks, render_block(element));
        }
    }

    push_block(blocks, paragraph(&inline));
}

fn push_block(blocks: &mut Vec<String>, block: String) {
    if !block.trim().is_empty() {
        blocks.push(block);
    }
}

fn render_block(element: ElementRef<'_>) -> String {
    match element.value().name() {
        name @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6") => {
            let text = inline_line(&element.inner_html());
            if text.is_empty() {
                return String::new();
            }
            let level = usize::from(name.as_bytes()[1] - b'0');
            format!("{} {}", "#".repeat(level), text)
        }
        "ul" | "ol" => {
            let mut lines = Vec::new();
            list_lines(element, "", &mut lines);
            lines.join("\n")
        }
        "table" => table(element),
        "hr" => "---".to_string(),
        "pre" => {
            let code: String = element.text().collect();
            format!("```\n{}\n```", code.trim_end_matches('\n'))
        }
        "blockquote" => {
            let mut inner = Vec::new();
            collect_blocks(element, &mut inner);
            inner
                .join("\n\n")
                .lines()
                .map(|line| if line.is_empty() { ">".to_string() } else { format!("> {line}") })
                .collect::<Vec<_>>()
                .join("\n")
        }
        _ => paragraph(&element.inner_html()),
    }
}

/// One line per item; nested lists are indented under their parent's text.
fn list_lines(list: ElementRef<'_>, indent: &str, lines: &mut Vec<String>) {
    let ordered = list.value().name() == "ol";
    let items = list
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "li");

    for (i, item) in items.enumerate() {
        let marker = if ordered {
            format!("{}.", i + 1)
        } else {
            "-".to_string()
        };

        let mut text = String::new();
        let mut nested = Vec::new();
        for node in item.children() {
            match ElementRef::wrap(node) {
                Some(el) if matches!(el.value().name(), "ul" | "ol") => nested.push(el),
                Some(el) => text.push_str(&el.html()),
                None => {
                    if let Some(t) = node.value().as_text() {
                        text.push_str(&escape_html(t));
                    }
                }
            }
        }

        let line = format!("{indent}{marker} {}", inline_line(&text));
        lines.push(line.trim_end().to_string());

        let child_indent = format!("{indent}{}", " ".repeat(marker.len() + 1));
        for list in nested {
            list_lines(list, &child_indent, lines);
        }
    }
}

/// Pipe table; the first row is the header.
fn table(table: ElementRef<'_>) -> String {
    let rows: Vec<Vec<String>> = table
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "tr")
        .map(|row| {
            row.children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| matches!(cell.value().name(), "th" | "td"))
                .map(|cell| inline_line(&cell.inner_html()).replace('|', "\\|"))
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    let render = |cells: &[String]| {
        let mut padded = cells.to_vec();
        padded.resize(width, String::new());
        format!("| {} |", padded.join(" | "))
    };

    let mut lines = vec![render(rows[0].as_slice()), format!("|{}", " --- |".repeat(width))];
    lines.extend(rows[1..].iter().map(|row| render(row.as_slice())));
    lines.join("\n")
}

/// Inline HTML as markdown, keeping hard line breaks.
fn paragraph(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    // Wrapped so the converter treats loose text as element content
    html2md::rewrite_html(&format!("<p>{html}</p>"), false)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Inline HTML as a single markdown line.
fn inline_line(html: &str) -> String {
    paragraph(html).lines().collect::<Vec<_>>().join(" ")
}

/// Collapse runs of blank lines, trim trailing whitespace, end with one newline.
pub fn clean_markdown(md: &str) -> String {
    let mut result = md.to_string();

    while result.contains("\n\n\n") {
        result = result.replace("\n\n\n", "\n\n");
    }

    result = result
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n");

    let trimmed = result.trim().to_string();
    if trimmed.is_empty() {
        String::new()
    } else {
        trimmed + "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_collapses_blank_runs_and_trailing_space() {
        assert_eq!(clean_markdown("\n\na  \n\n\n\n\nb\t\n\n"), "a\n\nb\n");
        assert_eq!(clean_markdown(" \n \n"), "");
    }

    #[test]
    fn converts_basic_html() {
        let md = html_to_markdown("<h1>Title</h1><p>Hello <strong>world</strong></p>");
        assert!(md.starts_with("# Title"), "got: {md:?}");
        assert!(md.contains("**world**"), "got: {md:?}");
    }

    #[test]
    fn blocks_are_separated_by_blank_lines() {
        let md = html_to_markdown("<h2>Sub</h2><p>Para</p><p>Another</p>");
        assert_eq!(md, "## Sub\n\nPara\n\nAnother\n");
    }

    #[test]
    fn nested_lists_keep_their_indentation() {
        let md = html_to_markdown("<ul><li>two<ul><li>inner</li></ul></li><li>three</li></ul>");
        assert_eq!(md, "- two\n  - inner\n- three\n");

        let md = html_to_markdown("<ol><li>a</li><li>b<ol><li>c</li></ol></li></ol>");
        assert_eq!(md, "1. a\n2. b\n   1. c\n");
    }

    #[test]
    fn tables_get_a_header_separator() {
        let md = html_to_markdown(
            "<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>",
        );
        assert_eq!(md, "| A | B |\n| --- | --- |\n| 1 | 2 |\n");
    }

    #[test]
    fn loose_inline_content_becomes_its_own_paragraph() {
        let md = html_to_markdown("intro <em>x</em><p>para</p>");
        assert!(md.starts_with("intro"), "got: {md:?}");
        assert!(md.ends_with("\n\npara\n"), "got: {md:?}");
    }

    #[test]
    fn quotes_and_entities() {
        assert_eq!(
            html_to_markdown("<blockquote><p>a</p><p>b</p></blockquote>"),
            "> a\n>\n> b\n"
        );
        assert_eq!(html_to_markdown("<p>Fish &amp; chips</p>"), "Fish & chips\n");
    }

    #[test]
    fn converts_unordered_list_with_hyphens() {
        let md = html_to_markdown("<ul><li>alpha</li><li>beta</li></ul>");
        for line in md.lines().filter(|l| !l.trim().is_empty()) {
            assert!(line.trim_start().starts_with("- "), "got: {md:?}");
        }
        assert!(md.contains("alpha") && md.contains("beta"));
    }
}
