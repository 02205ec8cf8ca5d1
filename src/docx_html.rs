use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use docx_rust::document::{
    BodyContent, ParagraphContent, RunContent, TableCellContent, TableRowContent,
};
use docx_rust::formatting::CharacterProperty;
use docx_rust::Docx;

/// Render a parsed DOCX document body as an HTML fragment
pub fn docx_to_html(docx: &Docx) -> String {
    let mut ctx = HtmlContext {
        docx,
        output: String::new(),
        open_lists: Vec::new(),
    };

    for content in &docx.document.body.content {
        ctx.convert_body_content(content);
    }
    ctx.close_lists();

    ctx.output
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Ordered,
    Unordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Ordered => "ol",
            ListKind::Unordered => "ul",
        }
    }
}

struct OpenList {
    level: isize,
    kind: ListKind,
}

struct HtmlContext<'a> {
    docx: &'a Docx<'a>,
    output: String,
    /// Lists currently open, outermost first. Each has an open `<li>`.
    open_lists: Vec<OpenList>,
}

impl<'a> HtmlContext<'a> {
    fn convert_body_content(&mut self, content: &BodyContent) {
        match content {
            BodyContent::Paragraph(para) => self.convert_paragraph(para),
            BodyContent::Table(table) => {
                self.close_lists();
                self.convert_table(table);
            }
            BodyContent::Sdt(sdt) => {
                if let Some(ref sdt_content) = sdt.content {
                    for item in &sdt_content.content {
                        self.convert_body_content(item);
                    }
                }
            }
            _ => {}
        }
    }

    fn convert_paragraph(&mut self, para: &docx_rust::document::Paragraph) {
        let mut heading_level: Option<u8> = None;
        let mut numbering: Option<(isize, isize)> = None; // (num_id, level)

        if let Some(ref prop) = para.property {
            if let Some(ref style_id) = prop.style_id {
                heading_level = heading_level_for_style(style_id.value.as_ref());
            }

            if let Some(ref num_prop) = prop.numbering {
                if let (Some(ref id), Some(ref level)) = (&num_prop.id, &num_prop.level) {
                    numbering = Some((id.value, level.value));
                }
            }
        }

        let inline_html = self.collect_inline_content(para);
        let inline_html = inline_html.trim();

        if let Some(level) = heading_level {
            self.close_lists();
            if !inline_html.is_empty() {
                self.output
                    .push_str(&format!("<h{level}>{inline_html}</h{level}>\n"));
            }
            return;
        }

        if let Some((num_id, level)) = numbering {
            let kind = self.resolve_list_kind(num_id, level);
            self.open_list_item(level, kind);
            self.output.push_str(inline_html);
            return;
        }

        self.close_lists();
        if !inline_html.is_empty() {
            self.output.push_str(&format!("<p>{inline_html}</p>\n"));
        }
    }

    /// Start a new `<li>`, opening or closing enclosing lists to reach `level`.
    fn open_list_item(&mut self, level: isize, kind: ListKind) {
        while let Some(top) = self.open_lists.last() {
            if top.level > level || (top.level == level && top.kind != kind) {
                let tag = top.kind.tag();
                self.output.push_str(&format!("</li></{tag}>\n"));
                self.open_lists.pop();
            } else {
                break;
            }
        }

        let sibling = matches!(self.open_lists.last(), Some(top) if top.level == level);
        if sibling {
            self.output.push_str("</li>\n");
        } else {
            self.output.push_str(&format!("<{}>\n", kind.tag()));
            self.open_lists.push(OpenList { level, kind });
        }

        self.output.push_str("<li>");
    }

    fn close_lists(&mut self) {
        while let Some(list) = self.open_lists.pop() {
            self.output
                .push_str(&format!("</li></{}>\n", list.kind.tag()));
        }
    }

    fn collect_inline_content(&mut self, para: &docx_rust::document::Paragraph) -> String {
        let mut result = String::new();

        for pc in &para.content {
            match pc {
                ParagraphContent::Run(run) => {
                    let text = self.collect_run_html(run);
                    if !text.is_empty() {
                        result.push_str(&format_run(&text, &run.property));
                    }
                }
                ParagraphContent::Link(link) => {
                    let display = link
                        .content
                        .as_ref()
                        .map(|run| self.collect_run_html(run))
                        .unwrap_or_default();

                    match self.resolve_hyperlink_target(link) {
                        Some(url) => {
                            let url = escape_html(&url);
                            let label = if display.is_empty() { url.clone() } else { display };
                            result.push_str(&format!("<a href=\"{url}\">{label}</a>"));
                        }
                        None => result.push_str(&display),
                    }
                }
                _ => {}
            }
        }

        result
    }

    fn collect_run_html(&mut self, run: &docx_rust::document::Run) -> String {
        let mut html = String::new();

        for rc in &run.content {
            match rc {
                RunContent::Text(t) => html.push_str(&escape_html(&t.text)),
                RunContent::Break(_) => html.push_str("<br>"),
                RunContent::Tab(_) => html.push('\t'),
                RunContent::Drawing(drawing) => {
                    if let Some(img) = self.convert_drawing(drawing) {
                        html.push_str(&img);
                    }
                }
                _ => {}
            }
        }

        html
    }

    fn convert_drawing(&self, drawing: &docx_rust::document::Drawing) -> Option<String> {
        if let Some(ref inline) = drawing.inline {
            if let Some(ref graphic) = inline.graphic {
                if let Some(pic) = graphic.data.children.first() {
                    let embed_id = pic.fill.blip.embed.as_ref();
                    let alt = inline.doc_property.descr.as_deref().unwrap_or("");
                    return self.resolve_image(embed_id, alt);
                }
            }
        }

        // Floating images
        if let Some(ref anchor) = drawing.anchor {
            if let Some(ref graphic) = anchor.graphic {
                if let Some(pic) = graphic.data.children.first() {
                    let embed_id = pic.fill.blip.embed.as_ref();
                    let alt = anchor.doc_property.descr.as_deref().unwrap_or("");
                    return self.resolve_image(embed_id, alt);
                }
            }
        }

        None
    }

    /// Embed the referenced media part as a `data:` URI.
    fn resolve_image(&self, embed_id: &str, alt: &str) -> Option<String> {
        let target = self
            .docx
            .document_rels
            .as_ref()?
            .relationships
            .iter()
            .find(|r| r.id.as_ref() == embed_id)?
            .target
            .as_ref();

        // Media parts are keyed by their full package path, e.g. word/media/image1.png
        let data = self
            .docx
            .media
            .iter()
            .find_map(|(path, (_media_type, data))| {
                let path: &str = path.as_ref();
                let matches = path == target || path.strip_prefix("word/") == Some(target);
                matches.then(|| data.to_vec())
            });

        let src = match data {
            Some(bytes) => format!("data:{};base64,{}", mime_for(target), STANDARD.encode(bytes)),
            None => {
                log::debug!("image part {} not found in package", target);
                target.to_string()
            }
        };

        Some(format!(
            "<img src=\"{}\" alt=\"{}\">",
            escape_html(&src),
            escape_html(alt)
        ))
    }

    fn resolve_hyperlink_target(&self, link: &docx_rust::document::Hyperlink) -> Option<String> {
        if let Some(ref anchor) = link.anchor {
            return Some(format!("#{}", anchor));
        }

        if let Some(ref id) = link.id {
            if let Some(ref rels) = self.docx.document_rels {
                for r in &rels.relationships {
                    if r.id.as_ref() == id.as_ref() {
                        return Some(r.target.to_string());
                    }
                }
            }
        }

        None
    }

    fn resolve_list_kind(&self, num_id: isize, level: isize) -> ListKind {
        let Some(ref numbering) = self.docx.numbering else {
            return ListKind::Unordered;
        };

        let abstract_id = numbering
            .numberings
            .iter()
            .filter(|num| num.num_id == Some(num_id))
            .find_map(|num| num.abstract_num_id.as_ref().map(|aid| aid.value));

        let Some(abstract_id) = abstract_id else {
            return ListKind::Unordered;
        };

        for abstract_num in &numbering.abstract_numberings {
            if abstract_num.abstract_num_id != abstract_id {
                continue;
            }
            for lvl in &abstract_num.levels {
                if lvl.i_level != Some(level) {
                    continue;
                }
                if let Some(ref fmt) = lvl.number_format {
                    return match fmt.value.as_ref() {
                        "decimal" | "upperRoman" | "lowerRoman" | "upperLetter"
                        | "lowerLetter" => ListKind::Ordered,
                        _ => ListKind::Unordered,
                    };
                }
            }
        }

        ListKind::Unordered
    }

    fn convert_table(&mut self, table: &docx_rust::document::Table) {
        let mut rows: Vec<Vec<String>> = Vec::new();

        for row in &table.rows {
            let mut cells: Vec<String> = Vec::new();

            for cell_content in &row.cells {
                if let TableRowContent::TableCell(cell) = cell_content {
                    cells.push(self.collect_cell_html(cell));
                }
            }

            if !cells.is_empty() {
                rows.push(cells);
            }
        }

        if rows.is_empty() {
            return;
        }

        self.output.push_str("<table>\n");
        for (i, row) in rows.iter().enumerate() {
            let tag = if i == 0 { "th" } else { "td" };
            self.output.push_str("<tr>");
            for cell in row {
                self.output.push_str(&format!("<{tag}>{cell}</{tag}>"));
            }
            self.output.push_str("</tr>\n");
        }
        self.output.push_str("</table>\n");
    }

    fn collect_cell_html(&mut self, cell: &docx_rust::document::TableCell) -> String {
        let mut parts: Vec<String> = Vec::new();

        for tc in &cell.content {
            let TableCellContent::Paragraph(para) = tc;
            let html = self.collect_inline_content(para);
            let trimmed = html.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed.to_string());
            }
        }

        parts.join("<br>")
    }
}

fn heading_level_for_style(style_id: &str) -> Option<u8> {
    match style_id {
        "Heading1" | "heading1" | "heading 1" => Some(1),
        "Heading2" | "heading2" | "heading 2" => Some(2),
        "Heading3" | "heading3" | "heading 3" => Some(3),
        "Heading4" | "heading4" | "heading 4" => Some(4),
        "Heading5" | "heading5" | "heading 5" => Some(5),
        "Heading6" | "heading6" | "heading 6" => Some(6),
        "Title" | "title" => Some(1),
        "Subtitle" | "subtitle" => Some(2),
        _ => None,
    }
}

/// Wrap run HTML in emphasis tags based on run properties
fn format_run(html: &str, props: &Option<CharacterProperty>) -> String {
    let Some(props) = props else {
        return html.to_string();
    };

    if html.trim().is_empty() {
        return html.to_string();
    }

    let is_bold = props
        .bold
        .as_ref()
        .map(|b| b.value != Some(false))
        .unwrap_or(false);
    let is_italic = props
        .italics
        .as_ref()
        .map(|i| i.value != Some(false))
        .unwrap_or(false);
    let is_strike = props.strike.is_some() || props.dstrike.is_some();

    let mut result = html.to_string();
    if is_strike {
        result = format!("<s>{result}</s>");
    }
    if is_italic {
        result = format!("<em>{result}</em>");
    }
    if is_bold {
        result = format!("<strong>{result}</strong>");
    }

    result
}

fn mime_for(path: &str) -> &'static str {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "emf" => "image/x-emf",
        "wmf" => "image/x-wmf",
        _ => "application/octet-stream",
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
