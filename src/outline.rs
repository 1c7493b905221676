//! Outline (table of contents) builder.
//!
//! Walks level 2-4 headings in document order, gives every heading a stable
//! id and fills the outline container with navigable entries.

use crate::document::{ContentSource, ElementRef, Navigator};
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::ops::RangeInclusive;
use tracing::debug;

/// Heading levels that appear in the outline
pub const OUTLINE_LEVELS: RangeInclusive<u8> = 2..=4;

/// One document heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingNode {
    pub id: String,
    pub level: u8,
    pub text: String,
    #[serde(skip)]
    pub element: ElementRef,
}

/// Headings in document order
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Outline {
    nodes: Vec<HeadingNode>,
}

impl Outline {
    pub fn nodes(&self) -> &[HeadingNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HeadingNode> {
        self.nodes.iter()
    }
}

impl<'a> IntoIterator for &'a Outline {
    type Item = &'a HeadingNode;
    type IntoIter = std::slice::Iter<'a, HeadingNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// Navigable outline entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub label: String,
    pub target_id: String,
    pub level: u8,
    pub element: ElementRef,
}

/// Outline mount point
#[derive(Debug, Default)]
pub struct OutlineContainer {
    entries: Vec<OutlineEntry>,
    selected: usize,
}

impl OutlineContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: OutlineEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[OutlineEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
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

    /// Scroll to the heading behind entry `index`
    pub fn activate<N: Navigator>(&mut self, index: usize, navigator: &mut N, offset: u32) -> bool {
        let Some(entry) = self.entries.get(index) else {
            return false;
        };
        self.selected = index;
        navigator.scroll_to(entry.element, offset);
        debug!(target_id = %entry.target_id, "navigated to outline entry");
        true
    }
}

/// Build the outline of `source` and populate `container`.
///
/// Headings without an id get `heading-<n>`, `n` being the heading's position
/// among the outlined headings; existing ids are never touched. When the
/// generated id is already taken elsewhere in the document a `-<k>` suffix
/// keeps it unique. Without a container the outline is disabled: nothing is
/// assigned and the outline is empty.
pub fn build_outline<S: ContentSource>(
    source: &mut S,
    container: Option<&mut OutlineContainer>,
) -> Outline {
    let Some(container) = container else {
        return Outline::default();
    };

    let headings: Vec<(ElementRef, u8)> = source
        .elements()
        .filter_map(|el| {
            source
                .kind(el)
                .heading_level()
                .filter(|level| OUTLINE_LEVELS.contains(level))
                .map(|level| (el, level))
        })
        .collect();

    let mut taken: FxHashSet<String> = source
        .elements()
        .filter_map(|el| source.id(el).map(str::to_string))
        .collect();

    let mut nodes = Vec::with_capacity(headings.len());

    for (index, (el, level)) in headings.into_iter().enumerate() {
        let id = match source.id(el) {
            Some(id) => id.to_string(),
            None => {
                let id = unique_id(format!("heading-{index}"), &taken);
                taken.insert(id.clone());
                source.set_id(el, id.clone());
                id
            }
        };

        let text = source.text(el).to_string();
        container.append(OutlineEntry {
            label: text.trim().to_string(),
            target_id: id.clone(),
            level,
            element: el,
        });
        nodes.push(HeadingNode {
            id,
            level,
            text,
            element: el,
        });
    }

    debug!(headings = nodes.len(), "outline built");
    Outline { nodes }
}

fn unique_id(base: String, taken: &FxHashSet<String>) -> String {
    if !taken.contains(&base) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
