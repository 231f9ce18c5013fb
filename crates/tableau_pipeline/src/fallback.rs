//! Local dialogue fallback.

use regex::Regex;
use std::sync::LazyLock;

/// Shortest prefix ending in terminal punctuation plus any closing quotes,
/// followed by whitespace or the end of the text.
static SENTENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)^(.*?[.!?…]+["'’”)\]]*)(?:\s|$)"#).expect("Valid sentence regex")
});

/// First sentence-terminated segment of `text`.
///
/// Returns the whole trimmed text when no terminator is present.
///
/// # Examples
///
/// ```
/// use tableau_pipeline::first_sentence;
///
/// assert_eq!(first_sentence("Run! They're coming. Now."), "Run!");
/// assert_eq!(first_sentence("  no terminator here "), "no terminator here");
/// ```
pub fn first_sentence(text: &str) -> String {
    let trimmed = text.trim();
    SENTENCE
        .captures(trimmed)
        .and_then(|captures| captures.get(1))
        .map(|segment| segment.as_str().trim().to_string())
        .unwrap_or_else(|| trimmed.to_string())
}
