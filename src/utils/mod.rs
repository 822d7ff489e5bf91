//! Utility functions and helpers.

pub mod http;
pub mod log;
pub mod url;

use unicode_segmentation::UnicodeSegmentation;

/// Shorten text to at most `max` graphemes for log output.
pub fn preview(text: &str, max: usize) -> String {
    if text.graphemes(true).count() <= max {
        return text.to_string();
    }
    let head: String = text.graphemes(true).take(max).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("short", 50), "short");
    }

    #[test]
    fn test_preview_truncates_long_text() {
        assert_eq!(preview("abcdefgh", 5), "abcde...");
    }

    #[test]
    fn test_preview_counts_graphemes_not_bytes() {
        assert_eq!(preview("Büroräume", 4), "Büro...");
    }
}
