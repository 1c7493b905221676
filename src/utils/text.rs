use memchr::memmem;

/// Lowercased copy of a text that remembers where each byte came from.
///
/// Lowercasing can change byte lengths (and occasionally char counts), so
/// every byte of the folded string maps back to the char index it was
/// produced from. Match positions are reported in chars of the original text.
pub struct FoldedText {
    folded: String,
    origin: Vec<usize>,
    char_count: usize,
}

impl FoldedText {
    pub fn new(text: &str) -> Self {
        let mut folded = String::with_capacity(text.len());
        let mut origin = Vec::with_capacity(text.len());
        let mut char_count = 0;

        for (idx, c) in text.chars().enumerate() {
            for lower in c.to_lowercase() {
                folded.push(lower);
                origin.extend(std::iter::repeat_n(idx, lower.len_utf8()));
            }
            char_count = idx + 1;
        }

        Self {
            folded,
            origin,
            char_count,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.folded
    }

    /// Number of chars in the original text
    pub fn char_count(&self) -> usize {
        self.char_count
    }

    /// Whether the already-lowercased `needle` occurs anywhere
    pub fn contains(&self, needle: &str) -> bool {
        memmem::find(self.folded.as_bytes(), needle.as_bytes()).is_some()
    }

    /// Char range in the original text of the first occurrence of `needle`
    pub fn find(&self, needle: &str) -> Option<(usize, usize)> {
        if needle.is_empty() {
            return None;
        }
        let pos = memmem::find(self.folded.as_bytes(), needle.as_bytes())?;
        let start = self.origin[pos];
        let end = self.origin[pos + needle.len() - 1] + 1;
        Some((start, end))
    }
}

/// Trim and lowercase a raw query.
///
/// Lowercases char by char, the same mapping [`FoldedText`] applies, so a
/// query always matches its own text. `str::to_lowercase` would turn a final
/// 'Σ' into 'ς' while the folded text has 'σ'.
pub fn normalize_query(raw: &str) -> String {
    raw.trim().chars().flat_map(char::to_lowercase).collect()
}

/// Byte offset of the char at `char_idx` (or the end of `text`)
pub fn char_to_byte(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

/// Slice `text` by char indices
pub fn slice_chars(text: &str, start: usize, end: usize) -> &str {
    let from = char_to_byte(text, start);
    let to = char_to_byte(text, end);
    &text[from..to.max(from)]
}
