use super::engine::SearchResult;
use super::highlight::{Segment, highlight, segments_to_html};
use crate::document::{ElementKind, ElementRef};

/// Placeholder shown when a scan matched nothing
pub const NO_RESULTS_TEXT: &str = "No results found";

/// One row of the result panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEntry {
    NoResults,
    Match {
        kind: ElementKind,
        segments: Vec<Segment>,
        element: ElementRef,
    },
}

impl PanelEntry {
    /// Navigation target, if the entry has one
    pub fn element(&self) -> Option<ElementRef> {
        match self {
            PanelEntry::NoResults => None,
            PanelEntry::Match { element, .. } => Some(*element),
        }
    }

    /// HTML rendering of the entry
    pub fn to_html(&self) -> String {
        match self {
            PanelEntry::NoResults => {
                format!("<div class=\"search-no-results\">{NO_RESULTS_TEXT}</div>")
            }
            PanelEntry::Match { kind, segments, .. } => format!(
                "<div class=\"search-result\"><div class=\"search-result-type\">{}</div>\
                 <div class=\"search-result-content\">{}</div></div>",
                kind.label(),
                segments_to_html(segments)
            ),
        }
    }
}

/// Result list mount point
#[derive(Debug, Default)]
pub struct ResultPanel {
    entries: Vec<PanelEntry>,
    visible: bool,
    selected: usize,
}

impl ResultPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the panel contents with `results` and show it
    pub fn render(&mut self, results: &[SearchResult<'_>], query: &str) {
        self.entries.clear();
        self.selected = 0;

        if results.is_empty() {
            self.entries.push(PanelEntry::NoResults);
        } else {
            self.entries.extend(results.iter().map(|result| PanelEntry::Match {
                kind: result.unit.kind,
                segments: highlight(&result.context, query),
                element: result.unit.element,
            }));
        }

        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn entries(&self) -> &[PanelEntry] {
        &self.entries
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        if !self.entries.is_empty() {
            self.selected = (self.selected + 1).min(self.entries.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Navigation target of the entry at `index`
    pub fn target(&self, index: usize) -> Option<ElementRef> {
        self.entries.get(index).and_then(PanelEntry::element)
    }

    /// Whole panel as HTML
    pub fn to_html(&self) -> String {
        self.entries.iter().map(PanelEntry::to_html).collect()
    }
}
