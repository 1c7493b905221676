//! Markdown loader.
//!
//! Turns a Markdown page into a [`Document`]: block elements with their full
//! text content (nested blocks contribute to every enclosing element, like a
//! DOM node's text content) and the rows the viewer draws, so every element
//! knows its layout offset.

use super::html::{self, HtmlToken};
use super::{Document, Element, ElementKind, LineStyle, ROW_UNITS, RenderedLine};
use anyhow::{Context, Result};
use chrono::DateTime;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read and load a Markdown file
pub fn load_markdown_file(path: &Path) -> Result<Document> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read document {}", path.display()))?;
    let mut doc = load_markdown(&content);
    doc.last_updated = fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .map(DateTime::from);
    debug!(
        path = %path.display(),
        elements = doc.elements.len(),
        rows = doc.lines.len(),
        "document loaded"
    );
    Ok(doc)
}

/// Load a Markdown page into a rendered document
pub fn load_markdown(source: &str) -> Document {
    let mut builder = Builder::default();
    let options = Options::ENABLE_HEADING_ATTRIBUTES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(source, options);

    for event in parser {
        builder.handle(event);
    }

    builder.finish()
}

#[derive(Default)]
struct Builder {
    elements: Vec<Element>,
    lines: Vec<RenderedLine>,
    /// Indices of elements currently receiving text
    open: Vec<usize>,
    /// Row being assembled
    current: String,
    current_style: Option<LineStyle>,
    has_text: bool,
    list_depth: usize,
    in_code: bool,
    code_buf: String,
    title: Option<String>,
    /// Raw HTML of the current block
    html_buf: String,
    in_html: bool,
    /// HTML elements open in the current block
    html_stack: Vec<HtmlBlock>,
}

/// HTML element the loader maps onto a document element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HtmlBlock {
    Heading(HeadingLevel),
    Paragraph,
    /// Paragraph opened for loose text outside any block tag
    Implicit,
    Item,
    List,
    Code,
    /// `script` and `style`; content never reaches the document
    Skip,
}

impl HtmlBlock {
    fn from_tag(name: &str) -> Option<Self> {
        let block = match name {
            "h1" => HtmlBlock::Heading(HeadingLevel::H1),
            "h2" => HtmlBlock::Heading(HeadingLevel::H2),
            "h3" => HtmlBlock::Heading(HeadingLevel::H3),
            "h4" => HtmlBlock::Heading(HeadingLevel::H4),
            "h5" => HtmlBlock::Heading(HeadingLevel::H5),
            "h6" => HtmlBlock::Heading(HeadingLevel::H6),
            "p" => HtmlBlock::Paragraph,
            "li" => HtmlBlock::Item,
            "ul" | "ol" => HtmlBlock::List,
            "pre" => HtmlBlock::Code,
            "script" | "style" => HtmlBlock::Skip,
            _ => return None,
        };
        Some(block)
    }

    fn closed_by(self, name: &str) -> bool {
        HtmlBlock::from_tag(name).is_some_and(|block| block == self)
    }

    /// Whether text may go straight into this element
    fn holds_text(self) -> bool {
        !matches!(self, HtmlBlock::List | HtmlBlock::Skip)
    }
}

impl Builder {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) | Event::Code(text) => self.text(&text),
            Event::SoftBreak | Event::HardBreak => self.text(" "),
            Event::Html(html) => {
                if self.in_html {
                    self.html_buf.push_str(&html);
                } else {
                    self.load_html(&html);
                }
            }
            // Inline tags are dropped, their text arrives as regular events
            Event::InlineHtml(tag) => {
                if tag.to_ascii_lowercase().starts_with("<br") {
                    self.text(" ");
                }
            }
            Event::Rule => {
                self.flush_line();
                self.lines.push(RenderedLine {
                    text: "─".repeat(40),
                    style: LineStyle::Body,
                });
                self.push_blank();
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, id, .. } => {
                self.flush_line();
                let level = level as u8;
                self.open_element(ElementKind::Heading(level), id.map(|id| id.to_string()));
                self.current_style = Some(LineStyle::Heading(level));
                self.current = format!("{} ", "#".repeat(level as usize));
            }
            Tag::Paragraph => {
                self.flush_line();
                if self.current.is_empty() {
                    self.current = "  ".repeat(self.list_depth);
                    self.current_style = Some(LineStyle::Body);
                }
                self.open_element(ElementKind::Paragraph, None);
            }
            Tag::Item => {
                self.flush_line();
                self.open_element(ElementKind::ListItem, None);
                self.current = format!("{}• ", "  ".repeat(self.list_depth.saturating_sub(1)));
                self.current_style = Some(LineStyle::ListItem);
            }
            Tag::List(_) => {
                self.flush_line();
                self.list_depth += 1;
            }
            Tag::CodeBlock(_) => {
                self.flush_line();
                self.open_element(ElementKind::CodeBlock, None);
                self.in_code = true;
                self.code_buf.clear();
            }
            Tag::HtmlBlock => {
                self.flush_line();
                self.in_html = true;
                self.html_buf.clear();
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(level) => {
                self.end_line();
                self.push_blank();
                if let Some(idx) = self.close_element()
                    && level as u8 == 1
                    && self.title.is_none()
                {
                    self.title = Some(self.elements[idx].text.clone());
                }
            }
            TagEnd::Paragraph => {
                self.end_line();
                if self.list_depth == 0 {
                    self.push_blank();
                }
                self.close_element();
            }
            TagEnd::Item => {
                self.end_line();
                self.close_element();
            }
            TagEnd::List(_) => {
                self.end_line();
                self.list_depth = self.list_depth.saturating_sub(1);
                if self.list_depth == 0 {
                    self.push_blank();
                }
            }
            TagEnd::CodeBlock => {
                self.in_code = false;
                let indent = "  ".repeat(self.list_depth + 2);
                for line in self.code_buf.lines() {
                    self.lines.push(RenderedLine {
                        text: format!("{indent}{line}"),
                        style: LineStyle::Code,
                    });
                }
                self.push_blank();
                self.close_element();
            }
            TagEnd::HtmlBlock => {
                self.in_html = false;
                let html = std::mem::take(&mut self.html_buf);
                self.load_html(&html);
            }
            _ => {}
        }
    }

    /// Map a chunk of raw HTML onto document elements. Elements left open at
    /// the end of the chunk are closed.
    fn load_html(&mut self, raw: &str) {
        for token in html::tokenize(raw) {
            match token {
                HtmlToken::Open {
                    name,
                    id,
                    self_closing,
                } => self.html_open(&name, id, self_closing),
                HtmlToken::Close { name } => self.html_close(&name),
                HtmlToken::Text(text) => self.html_text(&text),
            }
        }
        while let Some(block) = self.html_stack.pop() {
            self.html_end(block);
        }
    }

    fn html_open(&mut self, name: &str, id: Option<String>, self_closing: bool) {
        if name == "br" {
            self.html_text(" ");
            return;
        }
        let Some(block) = HtmlBlock::from_tag(name) else {
            return;
        };
        if self_closing || self.html_stack.contains(&HtmlBlock::Skip) {
            return;
        }

        // Block tags end an open paragraph, a new item ends its sibling
        while let Some(&top) = self.html_stack.last() {
            let ends_top = matches!(top, HtmlBlock::Paragraph | HtmlBlock::Implicit)
                || (top == HtmlBlock::Item && block == HtmlBlock::Item);
            if !ends_top {
                break;
            }
            self.html_stack.pop();
            self.html_end(top);
        }

        match block {
            HtmlBlock::Heading(level) => self.start(Tag::Heading {
                level,
                id: id.map(CowStr::from),
                classes: Vec::new(),
                attrs: Vec::new(),
            }),
            HtmlBlock::Paragraph | HtmlBlock::Implicit => self.start(Tag::Paragraph),
            HtmlBlock::Item => self.start(Tag::Item),
            HtmlBlock::List => self.start(Tag::List(None)),
            HtmlBlock::Code => self.start(Tag::CodeBlock(CodeBlockKind::Indented)),
            HtmlBlock::Skip => {}
        }
        self.html_stack.push(block);
    }

    fn html_close(&mut self, name: &str) {
        let Some(pos) = self.html_stack.iter().rposition(|b| b.closed_by(name)) else {
            return;
        };
        while self.html_stack.len() > pos {
            if let Some(block) = self.html_stack.pop() {
                self.html_end(block);
            }
        }
    }

    fn html_end(&mut self, block: HtmlBlock) {
        match block {
            HtmlBlock::Heading(level) => self.end(TagEnd::Heading(level)),
            HtmlBlock::Paragraph | HtmlBlock::Implicit => self.end(TagEnd::Paragraph),
            HtmlBlock::Item => self.end(TagEnd::Item),
            HtmlBlock::List => self.end(TagEnd::List(false)),
            HtmlBlock::Code => self.end(TagEnd::CodeBlock),
            HtmlBlock::Skip => {}
        }
    }

    fn html_text(&mut self, raw: &str) {
        if self.html_stack.contains(&HtmlBlock::Skip) {
            return;
        }
        if self.html_stack.contains(&HtmlBlock::Code) {
            // Like the browser, drop the newline right after <pre>
            let text = if self.code_buf.is_empty() {
                raw.strip_prefix('\n').unwrap_or(raw)
            } else {
                raw
            };
            self.text(text);
            return;
        }

        let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        let holds_text = self.html_stack.last().is_some_and(|b| b.holds_text());

        if collapsed.is_empty() {
            // Whitespace only separates words inside an element
            if holds_text && !raw.is_empty() && self.open_text_is_started() {
                self.text(" ");
            }
            return;
        }

        if !holds_text {
            self.html_open("p", None, false);
            if let Some(top) = self.html_stack.last_mut() {
                *top = HtmlBlock::Implicit;
            }
        }

        let mut text = String::with_capacity(collapsed.len() + 2);
        if raw.starts_with(char::is_whitespace) && self.open_text_is_started() {
            text.push(' ');
        }
        text.push_str(&collapsed);
        if raw.ends_with(char::is_whitespace) {
            text.push(' ');
        }
        self.text(&text);
    }

    /// Whether the innermost open element already has text
    fn open_text_is_started(&self) -> bool {
        self.open
            .last()
            .is_some_and(|&idx| !self.elements[idx].text.is_empty())
    }

    fn text(&mut self, text: &str) {
        for &idx in &self.open {
            self.elements[idx].text.push_str(text);
        }
        if self.in_code {
            self.code_buf.push_str(text);
        } else {
            self.current.push_str(text);
            self.has_text = true;
        }
    }

    fn open_element(&mut self, kind: ElementKind, id: Option<String>) {
        // Keep words of sibling blocks apart in enclosing elements
        for &idx in &self.open {
            let text = &mut self.elements[idx].text;
            if !text.is_empty() && !text.ends_with(char::is_whitespace) {
                text.push(' ');
            }
        }

        self.elements.push(Element {
            kind,
            id,
            text: String::new(),
            offset_top: self.lines.len() as u32 * ROW_UNITS,
        });
        self.open.push(self.elements.len() - 1);
    }

    fn close_element(&mut self) -> Option<usize> {
        let idx = self.open.pop()?;
        let text = &mut self.elements[idx].text;
        let trimmed = text.trim_end().len();
        text.truncate(trimmed);
        Some(idx)
    }

    /// Emit the pending row if it carries any text
    fn flush_line(&mut self) {
        if !self.has_text {
            return;
        }
        self.lines.push(RenderedLine {
            text: std::mem::take(&mut self.current),
            style: self.current_style.take().unwrap_or(LineStyle::Body),
        });
        self.has_text = false;
    }

    /// Close the pending row, dropping a prefix that never got text
    fn end_line(&mut self) {
        self.flush_line();
        self.current.clear();
        self.current_style = None;
    }

    fn push_blank(&mut self) {
        if self.lines.last().is_some_and(|l| l.style != LineStyle::Blank) {
            self.lines.push(RenderedLine {
                text: String::new(),
                style: LineStyle::Blank,
            });
        }
    }

    fn finish(mut self) -> Document {
        self.flush_line();
        while self.close_element().is_some() {}

        Document {
            title: self.title,
            elements: self.elements,
            lines: self.lines,
            last_updated: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ContentSource;

    fn kinds(doc: &Document) -> Vec<ElementKind> {
        doc.elements.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_load_headings_and_paragraphs() {
        let doc = load_markdown("# Drone Docs\n\n## Getting Started\n\nConnect the drone via USB cable.\n");

        assert_eq!(
            kinds(&doc),
            vec![
                ElementKind::Heading(1),
                ElementKind::Heading(2),
                ElementKind::Paragraph
            ]
        );
        assert_eq!(doc.title.as_deref(), Some("Drone Docs"));
        assert_eq!(doc.elements[1].text, "Getting Started");
        assert_eq!(doc.elements[2].text, "Connect the drone via USB cable.");
    }

    #[test]
    fn test_heading_attribute_ids() {
        let doc = load_markdown("## Introduction {#intro}\n\n## Setup\n");
        assert_eq!(doc.elements[0].id.as_deref(), Some("intro"));
        assert_eq!(doc.elements[0].text, "Introduction");
        assert_eq!(doc.elements[1].id, None);
    }

    #[test]
    fn test_offsets_follow_rendered_rows() {
        let doc = load_markdown("## One\n\nFirst paragraph.\n\n## Two\n");

        // "## One", blank, "First paragraph.", blank, "## Two"
        assert_eq!(doc.elements[0].offset_top, 0);
        assert_eq!(doc.elements[1].offset_top, 2 * ROW_UNITS);
        assert_eq!(doc.elements[2].offset_top, 4 * ROW_UNITS);
        assert_eq!(doc.lines[0].text, "## One");
        assert_eq!(doc.lines[0].style, LineStyle::Heading(2));
    }

    #[test]
    fn test_nested_list_text_content() {
        let doc = load_markdown("- outer\n  - inner one\n  - inner two\n- last\n");

        let items: Vec<&str> = doc
            .elements
            .iter()
            .filter(|e| e.kind == ElementKind::ListItem)
            .map(|e| e.text.as_str())
            .collect();

        assert_eq!(items, vec!["outer inner one inner two", "inner one", "inner two", "last"]);
        assert!(doc.lines.iter().any(|l| l.text == "  • inner one"));
    }

    #[test]
    fn test_loose_list_paragraphs() {
        let doc = load_markdown("- first item\n\n- second item\n");

        assert_eq!(
            kinds(&doc),
            vec![
                ElementKind::ListItem,
                ElementKind::Paragraph,
                ElementKind::ListItem,
                ElementKind::Paragraph
            ]
        );
        assert_eq!(doc.elements[0].offset_top, doc.elements[1].offset_top);
        assert_eq!(doc.lines[0].text, "• first item");
    }

    #[test]
    fn test_code_blocks_are_kept_but_not_searchable() {
        let doc = load_markdown("Intro text.\n\n```rust\nfn main() {}\n```\n");

        assert_eq!(doc.kind(crate::document::ElementRef(1)), ElementKind::CodeBlock);
        assert_eq!(doc.elements[1].text, "fn main() {}");
        assert!(doc.lines.iter().any(|l| l.style == LineStyle::Code && l.text.ends_with("fn main() {}")));
    }

    #[test]
    fn test_inline_code_and_breaks() {
        let doc = load_markdown("Run `docnav`\nto start.\n");
        assert_eq!(doc.elements[0].text, "Run docnav to start.");
    }

    #[test]
    fn test_empty_document() {
        let doc = load_markdown("");
        assert!(doc.elements.is_empty());
        assert!(doc.lines.is_empty());
        assert_eq!(doc.height(), 0);
    }

    fn texts(doc: &Document, kind: ElementKind) -> Vec<&str> {
        doc.elements
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.text.as_str())
            .collect()
    }

    #[test]
    fn test_html_page_scenario() {
        let doc = load_markdown("<h2>Getting Started</h2><p>Connect the drone via USB cable.</p>\n");

        assert_eq!(kinds(&doc), vec![ElementKind::Heading(2), ElementKind::Paragraph]);
        assert_eq!(doc.elements[0].text, "Getting Started");
        assert_eq!(doc.elements[1].text, "Connect the drone via USB cable.");

        let results = crate::search::scan(&doc, "drone", &crate::search::SearchOptions::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].unit.kind, ElementKind::Paragraph);
        assert_eq!(results[0].context, "Connect the drone via USB cable.");
    }

    #[test]
    fn test_html_blocks_mixed_with_markdown() {
        let doc = load_markdown(
            "The drone hovers.\n\n<p>Raw drone paragraph.</p>\n\n<ul>\n<li>First</li>\n<li>Second <b>bold</b></li>\n</ul>\n",
        );

        assert_eq!(
            texts(&doc, ElementKind::Paragraph),
            vec!["The drone hovers.", "Raw drone paragraph."]
        );
        assert_eq!(texts(&doc, ElementKind::ListItem), vec!["First", "Second bold"]);
        assert!(doc.lines.iter().any(|l| l.text == "• First"));
    }

    #[test]
    fn test_html_heading_id_survives_outline() {
        let mut doc = load_markdown("<h3 id=\"wiring\">Wiring</h3>\n\n## Flight\n");
        let outline = crate::outline::build_outline(
            &mut doc,
            Some(&mut crate::outline::OutlineContainer::new()),
        );

        let ids: Vec<&str> = outline.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["wiring", "heading-1"]);
        assert_eq!(outline.nodes()[0].level, 3);
    }

    #[test]
    fn test_html_pre_is_code() {
        let doc = load_markdown("<pre>\ndrone calibrate\n</pre>\n");
        assert_eq!(kinds(&doc), vec![ElementKind::CodeBlock]);
        assert_eq!(doc.elements[0].text, "drone calibrate");
    }

    #[test]
    fn test_loose_html_text_becomes_paragraph() {
        let doc = load_markdown("<div>\nLoose drone text\n<script>var drone = 1;</script>\n</div>\n");
        assert_eq!(kinds(&doc), vec![ElementKind::Paragraph]);
        assert_eq!(doc.elements[0].text, "Loose drone text");
    }

    #[test]
    fn test_inline_html_tags_are_stripped() {
        let doc = load_markdown("Press <kbd>Ctrl</kbd>+<kbd>C</kbd> to quit.<br>Then restart.\n");
        assert_eq!(doc.elements[0].text, "Press Ctrl+C to quit. Then restart.");
    }

    #[test]
    fn test_load_file_records_modified_time() {
        let dir = std::env::temp_dir()
            .join("docnav_test_markdown")
            .join(std::process::id().to_string());
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("page.md");
        fs::write(&path, "# Page\n\nBody.\n").unwrap();

        let doc = load_markdown_file(&path).unwrap();
        let modified: chrono::DateTime<chrono::Utc> =
            fs::metadata(&path).unwrap().modified().unwrap().into();
        assert_eq!(doc.last_updated, Some(modified));
        assert_eq!(doc.title.as_deref(), Some("Page"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = load_markdown_file(Path::new("no/such/page.md")).unwrap_err();
        assert!(format!("{err:#}").contains("no/such/page.md"));
    }
}
