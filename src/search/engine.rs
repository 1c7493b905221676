use super::SearchOptions;
use super::context::context_window;
use crate::document::{ContentSource, ElementKind, ElementRef};
use crate::utils::text::FoldedText;
use serde::Serialize;
use tracing::debug;

/// One content element eligible for matching
#[derive(Debug, Clone, Serialize)]
pub struct SearchableUnit<'a> {
    pub text: &'a str,
    pub kind: ElementKind,
    /// Where to navigate on selection. Never used for identity.
    pub element: ElementRef,
}

/// A matched unit with its context window
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult<'a> {
    #[serde(flatten)]
    pub unit: SearchableUnit<'a>,
    pub context: String,
    pub query: String,
}

/// Headings, paragraphs and list items, in document order.
///
/// Units borrow the live text, so they always reflect the document at scan
/// time.
pub fn searchable_units<S: ContentSource>(source: &S) -> impl Iterator<Item = SearchableUnit<'_>> {
    source
        .elements()
        .filter(move |&el| source.kind(el).is_searchable())
        .map(move |el| SearchableUnit {
            text: source.text(el),
            kind: source.kind(el),
            element: el,
        })
}

/// Scan the document for `query` (already trimmed and lowercased).
///
/// Every unit whose text contains the query is matched, in document order,
/// then the list is cut to `options.max_results`.
pub fn scan<'a, S: ContentSource>(
    source: &'a S,
    query: &str,
    options: &SearchOptions,
) -> Vec<SearchResult<'a>> {
    if query.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<SearchResult<'a>> = searchable_units(source)
        .filter(|unit| FoldedText::new(unit.text).contains(query))
        .map(|unit| SearchResult {
            context: context_window(unit.text, query, options.context_chars),
            query: query.to_string(),
            unit,
        })
        .collect();

    let matched = results.len();
    results.truncate(options.max_results);
    debug!(query, matched, shown = results.len(), "scan complete");

    results
}
