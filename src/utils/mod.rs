//! Utility functions and helpers.

pub mod http;

use unicode_segmentation::UnicodeSegmentation;
use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Cut text to at most `limit` grapheme clusters, appending `…` when cut.
pub fn truncate(text: &str, limit: usize) -> String {
    let mut graphemes = text.grapheme_indices(true);
    match graphemes.nth(limit) {
        Some((idx, _)) => format!("{}…", text[..idx].trim_end()),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://vusa.forums.net/board/21/news").unwrap();
        assert_eq!(
            resolve_url(&base, "/thread/5/welcome"),
            "https://vusa.forums.net/thread/5/welcome"
        );
        assert_eq!(
            resolve_url(&base, "https://other.net/thread/9"),
            "https://other.net/thread/9"
        );
    }

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_long_text() {
        assert_eq!(truncate("hello world", 5), "hello…");
    }

    #[test]
    fn test_truncate_respects_graphemes() {
        assert_eq!(truncate("héllo wörld", 4), "héll…");
        assert_eq!(truncate("👍🏽👍🏽👍🏽", 2), "👍🏽👍🏽…");
    }
}
