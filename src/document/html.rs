//! Tokenizer for raw HTML embedded in a Markdown page.
//!
//! Only what the loader needs: tag names, the `id` attribute, and text with
//! the common entities decoded. Comments are dropped.

use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<!--.*?-->|<(/?)([A-Za-z][A-Za-z0-9]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
        .expect("BUG: invalid TAG_RE regex literal")
});

static ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)id\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>/]+))"#)
        .expect("BUG: invalid ID_RE regex literal")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlToken {
    Open {
        /// Lowercased tag name
        name: String,
        id: Option<String>,
        self_closing: bool,
    },
    Close {
        name: String,
    },
    Text(String),
}

/// Split `html` into tags and text runs
pub fn tokenize(html: &str) -> Vec<HtmlToken> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in TAG_RE.captures_iter(html) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            tokens.push(HtmlToken::Text(decode_entities(&html[last..whole.start()])));
        }
        last = whole.end();

        // Comment
        let Some(name) = caps.get(2) else {
            continue;
        };
        let name = name.as_str().to_ascii_lowercase();
        let attrs = caps.get(3).map_or("", |m| m.as_str());

        if caps.get(1).is_some_and(|m| !m.as_str().is_empty()) {
            tokens.push(HtmlToken::Close { name });
        } else {
            tokens.push(HtmlToken::Open {
                name,
                id: attribute_id(attrs),
                self_closing: attrs.trim_end().ends_with('/'),
            });
        }
    }

    if last < html.len() {
        tokens.push(HtmlToken::Text(decode_entities(&html[last..])));
    }

    tokens
}

fn attribute_id(attrs: &str) -> Option<String> {
    let caps = ID_RE.captures(attrs)?;
    let value = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;
    let id = decode_entities(value.as_str());
    (!id.is_empty()).then_some(id)
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
