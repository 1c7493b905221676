use crate::utils::text::{FoldedText, slice_chars};

const ELLIPSIS: &str = "...";

/// Extract the text surrounding the first occurrence of `query`.
///
/// Takes `context_chars / 2` chars on each side of the match, clamped to the
/// text, and marks a truncated side with `...`. Text that is not longer than
/// `context_chars` is returned whole.
pub fn context_window(text: &str, query: &str, context_chars: usize) -> String {
    let folded = FoldedText::new(text);
    let len = folded.char_count();

    if len <= context_chars {
        return text.to_string();
    }

    let Some((match_start, match_end)) = folded.find(query) else {
        return slice_chars(text, 0, context_chars).to_string();
    };

    let half = context_chars / 2;
    let start = match_start.saturating_sub(half);
    let end = (match_end + half).min(len);

    let mut context = String::with_capacity(end - start + 2 * ELLIPSIS.len());
    if start > 0 {
        context.push_str(ELLIPSIS);
    }
    context.push_str(slice_chars(text, start, end));
    if end < len {
        context.push_str(ELLIPSIS);
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler(n: usize) -> String {
        "x".repeat(n)
    }

    #[test]
    fn test_short_text_returned_whole() {
        let text = "Connect the drone via USB cable.";
        assert_eq!(context_window(text, "drone", 100), text);
    }

    #[test]
    fn test_exactly_target_length_returned_whole() {
        let text = format!("{}drone", filler(95));
        assert_eq!(text.chars().count(), 100);
        assert_eq!(context_window(&text, "drone", 100), text);
    }

    #[test]
    fn test_truncated_both_sides() {
        let text = format!("{} drone {}", filler(200), filler(200));
        let context = context_window(&text, "drone", 100);

        assert!(context.starts_with("..."));
        assert!(context.ends_with("..."));
        assert!(context.contains("drone"));

        // Roughly the target window plus the match and both markers
        let inner = context.chars().count() - 6;
        assert!((100..=110).contains(&inner), "window was {inner} chars");
    }

    #[test]
    fn test_match_near_start_has_no_prefix() {
        let text = format!("drone {}", filler(300));
        let context = context_window(&text, "drone", 100);

        assert!(context.starts_with("drone"));
        assert!(context.ends_with("..."));
    }

    #[test]
    fn test_match_near_end_has_no_suffix() {
        let text = format!("{} drone", filler(300));
        let context = context_window(&text, "drone", 100);

        assert!(context.starts_with("..."));
        assert!(context.ends_with("drone"));
    }

    #[test]
    fn test_case_insensitive_match_keeps_original_case() {
        let text = format!("{} The DRONE hovers {}", filler(120), filler(120));
        let context = context_window(&text, "drone", 100);
        assert!(context.contains("The DRONE hovers"));
        assert!(context.to_lowercase().contains("drone"));
    }

    #[test]
    fn test_multibyte_text_is_sliced_on_chars() {
        let text = format!("{} héliçoptère drone {}", "é".repeat(150), "ü".repeat(150));
        let context = context_window(&text, "drone", 100);
        assert!(context.contains("drone"));
        assert!(context.starts_with("...é"));
        assert!(context.ends_with("ü..."));
    }

    #[test]
    fn test_no_match_falls_back_to_leading_text() {
        let text = filler(250);
        let context = context_window(&text, "drone", 100);
        assert_eq!(context, filler(100));
    }
}
