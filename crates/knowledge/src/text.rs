//! Character-safe truncation helpers.
//!
//! Titles and snippets are mostly CJK, so lengths count grapheme clusters
//! rather than bytes.

use unicode_segmentation::UnicodeSegmentation;

/// The first `max` graphemes of `text`.
pub fn truncate(text: &str, max: usize) -> &str {
    match text.grapheme_indices(true).nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// `text` cut to `max` graphemes with `...` appended, only when it is longer.
pub fn ellipsize(text: &str, max: usize) -> String {
    let head = truncate(text, max);
    if head.len() < text.len() {
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_graphemes() {
        assert_eq!(truncate("勞工退休金提繳率", 4), "勞工退休");
        assert_eq!(truncate("短", 10), "短");
        assert_eq!(truncate("", 3), "");
        assert_eq!(truncate("⚠️ab", 1), "⚠️");
    }

    #[test]
    fn test_ellipsize() {
        assert_eq!(ellipsize("資遣費如何計算", 3), "資遣費...");
        assert_eq!(ellipsize("資遣費", 3), "資遣費");
    }
}
