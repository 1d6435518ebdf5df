//! Word-boundary truncation for feed summaries

/// Appended to truncated text
pub const ELLIPSIS: &str = "...";

/// Default summary length, in characters
pub const SUMMARY_LENGTH: usize = 500;

/// Truncates text at the last word boundary within `length` characters
///
/// Text no longer than `length` is returned unchanged. A single word longer
/// than `length` is cut at `length`.
///
/// # Example
///
/// ```
/// use mailman_mirror::smart_truncate;
///
/// assert_eq!(smart_truncate("one two three", 7), "one two...");
/// assert_eq!(smart_truncate("one two", 7), "one two");
/// ```
pub fn smart_truncate(content: &str, length: usize) -> String {
    if content.chars().count() <= length {
        return content.to_string();
    }

    let cut = content
        .char_indices()
        .nth(length)
        .map(|(i, _)| i)
        .unwrap_or(content.len());
    let head = &content[..cut];

    let kept = if content[cut..].starts_with(char::is_whitespace) {
        head
    } else {
        match head.rfind(char::is_whitespace) {
            Some(space) => &head[..space],
            None => head,
        }
    };

    format!("{}{}", kept.trim_end(), ELLIPSIS)
}
