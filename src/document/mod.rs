//! Rendered document model.
//!
//! A [`Document`] is the in-memory equivalent of a rendered documentation
//! page: an ordered list of block elements (headings, paragraphs, list items,
//! code blocks) plus the text rows the viewer draws. The outline builder and
//! the search engine only see it through the [`ContentSource`] capability, and
//! navigation goes through [`Navigator`].

mod html;
pub mod markdown;

pub use markdown::load_markdown;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Layout units per rendered row.
pub const ROW_UNITS: u32 = 20;

/// Height of the fixed header, in layout units. Navigation lands this far
/// below the viewport top so the target is not hidden under the header.
pub const HEADER_OFFSET: u32 = 80;

/// Non-owning handle to an element of a [`ContentSource`], in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ElementRef(pub usize);

impl ElementRef {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Block element category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Heading with its depth (1..=6)
    Heading(u8),
    Paragraph,
    ListItem,
    CodeBlock,
}

impl ElementKind {
    /// Label shown next to search results
    pub fn label(self) -> &'static str {
        match self {
            ElementKind::Heading(_) => "heading",
            ElementKind::Paragraph => "paragraph",
            ElementKind::ListItem => "list-item",
            ElementKind::CodeBlock => "code",
        }
    }

    pub fn heading_level(self) -> Option<u8> {
        match self {
            ElementKind::Heading(level) => Some(level),
            _ => None,
        }
    }

    /// Whether the in-page search looks at this element
    pub fn is_searchable(self) -> bool {
        !matches!(self, ElementKind::CodeBlock)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ElementKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One block element of the rendered document
#[derive(Debug, Clone)]
pub struct Element {
    pub kind: ElementKind,
    pub id: Option<String>,
    /// Full text content, including nested elements
    pub text: String,
    /// Distance from the document top, in layout units
    pub offset_top: u32,
}

/// Visual role of a rendered row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Heading(u8),
    Body,
    ListItem,
    Code,
    Blank,
}

/// A row of the rendered document as the viewer draws it
#[derive(Debug, Clone)]
pub struct RenderedLine {
    pub text: String,
    pub style: LineStyle,
}

/// Rendered documentation page
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Text of the first top-level heading, if any
    pub title: Option<String>,
    pub elements: Vec<Element>,
    pub lines: Vec<RenderedLine>,
    /// Modification time of the source file
    pub last_updated: Option<DateTime<Utc>>,
}

impl Document {
    pub fn get(&self, el: ElementRef) -> Option<&Element> {
        self.elements.get(el.index())
    }

    /// Find the element carrying `id`
    pub fn find_by_id(&self, id: &str) -> Option<ElementRef> {
        self.elements
            .iter()
            .position(|e| e.id.as_deref() == Some(id))
            .map(ElementRef)
    }

    /// Total document height in layout units
    pub fn height(&self) -> u32 {
        self.lines.len() as u32 * ROW_UNITS
    }

    /// First code block with a row inside `[start, end)` layout units
    pub fn code_block_in(&self, start: u32, end: u32) -> Option<ElementRef> {
        self.elements
            .iter()
            .position(|e| {
                let rows = e.text.lines().count().max(1) as u32;
                e.kind == ElementKind::CodeBlock
                    && e.offset_top < end
                    && e.offset_top + rows * ROW_UNITS > start
            })
            .map(ElementRef)
    }

    /// Last-updated date as shown in the status bar, e.g. "October 18, 2026"
    pub fn last_updated_label(&self) -> Option<String> {
        self.last_updated
            .map(|date| date.format("%B %-d, %Y").to_string())
    }
}

/// Read access to the document's block elements, in document order.
///
/// The only write the core ever performs is assigning a missing heading id.
pub trait ContentSource {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn kind(&self, el: ElementRef) -> ElementKind;

    fn text(&self, el: ElementRef) -> &str;

    fn id(&self, el: ElementRef) -> Option<&str>;

    fn set_id(&mut self, el: ElementRef, id: String);

    fn offset_top(&self, el: ElementRef) -> u32;

    /// All elements in document order
    fn elements(&self) -> impl Iterator<Item = ElementRef> {
        (0..self.len()).map(ElementRef)
    }
}

impl ContentSource for Document {
    fn len(&self) -> usize {
        self.elements.len()
    }

    fn kind(&self, el: ElementRef) -> ElementKind {
        self.elements[el.index()].kind
    }

    fn text(&self, el: ElementRef) -> &str {
        &self.elements[el.index()].text
    }

    fn id(&self, el: ElementRef) -> Option<&str> {
        self.elements[el.index()].id.as_deref()
    }

    fn set_id(&mut self, el: ElementRef, id: String) {
        self.elements[el.index()].id = Some(id);
    }

    fn offset_top(&self, el: ElementRef) -> u32 {
        self.elements[el.index()].offset_top
    }
}

/// Scoped smooth-scroll navigation primitive.
pub trait Navigator {
    /// Scroll so that `target`'s top sits `offset` layout units below the
    /// viewport top.
    fn scroll_to(&mut self, target: ElementRef, offset: u32);
}
