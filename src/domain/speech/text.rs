use regex::Regex;
use std::sync::OnceLock;

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"https?://[^\s]+").expect("valid url pattern"))
}

fn whitespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

/// Prepare extracted page text for narration.
///
/// Page extraction joins text runs with spaces and keeps layout line breaks,
/// so whitespace is collapsed and bare URLs (unreadable aloud) are dropped.
pub fn clean_text(text: &str) -> String {
    let without_urls = url_pattern().replace_all(text, "");
    let normalized = whitespace_pattern().replace_all(&without_urls, " ");
    normalized.trim().to_string()
}
