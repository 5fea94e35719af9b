use regex::Regex;
use std::sync::LazyLock;

/// Maximum number of characters kept by [`normalize`].
pub const DEFAULT_MAX_CHARS: usize = 8000;

/// Appended to any text cut down to the length limit.
pub const TRUNCATION_MARKER: &str = "\n…(truncated)";

static TRAILING_SPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+\n").unwrap());

static BLANK_LINES_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Normalize with the default length limit.
pub fn normalize(text: &str) -> String {
    normalize_with_limit(text, DEFAULT_MAX_CHARS)
}

/// Tidy whitespace and cap the length at `max_chars` characters.
///
/// Horizontal whitespace before a line break is dropped, three or more line
/// breaks collapse to a single blank line, and the result is trimmed. Text
/// still longer than `max_chars` is cut and suffixed with
/// [`TRUNCATION_MARKER`].
pub fn normalize_with_limit(text: &str, max_chars: usize) -> String {
    let text = text.replace("\r\n", "\n");
    let text = TRAILING_SPACE_REGEX.replace_all(&text, "\n");
    let text = BLANK_LINES_REGEX.replace_all(&text, "\n\n");
    let text = text.trim();

    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
