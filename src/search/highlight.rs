use regex::RegexBuilder;
use serde::Serialize;
use tracing::warn;

/// A run of result text, either plain or a marked match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Segment {
    Plain(String),
    Mark(String),
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Plain(text) | Segment::Mark(text) => text,
        }
    }

    pub fn is_mark(&self) -> bool {
        matches!(self, Segment::Mark(_))
    }
}

/// Split `text` into plain and marked runs, marking every case-insensitive
/// occurrence of `query`.
///
/// The query is always matched literally: regex metacharacters are escaped
/// before the pattern is built.
pub fn highlight(text: &str, query: &str) -> Vec<Segment> {
    if query.is_empty() || text.is_empty() {
        return vec![Segment::Plain(text.to_string())];
    }

    let pattern = match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => pattern,
        Err(e) => {
            warn!(error = %e, "could not build highlight pattern");
            return vec![Segment::Plain(text.to_string())];
        }
    };

    let mut segments = Vec::new();
    let mut last = 0;

    for m in pattern.find_iter(text) {
        if m.start() > last {
            segments.push(Segment::Plain(text[last..m.start()].to_string()));
        }
        segments.push(Segment::Mark(m.as_str().to_string()));
        last = m.end();
    }

    if last < text.len() {
        segments.push(Segment::Plain(text[last..].to_string()));
    }

    segments
}

/// Render segments as HTML, wrapping marks in `<mark>`
pub fn segments_to_html(segments: &[Segment]) -> String {
    let mut html = String::new();
    for segment in segments {
        match segment {
            Segment::Plain(text) => html.push_str(&escape_html(text)),
            Segment::Mark(text) => {
                html.push_str("<mark>");
                html.push_str(&escape_html(text));
                html.push_str("</mark>");
            }
        }
    }
    html
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
