//! Common utilities and helper functions

pub mod retry;

/// Shorten text to at most `max_chars` characters for log output
///
/// Counts characters, not bytes, so Cyrillic text is never split inside a
/// code point.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let truncated: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{truncated}...")
}
