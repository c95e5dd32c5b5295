//! String helpers for filenames and logging.

/// Longest title segment allowed in a post filename, in characters.
pub const MAX_SLUG_CHARS: usize = 50;

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (backing off to a character
/// boundary) with an ellipsis and byte count appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Turn a post title into the filename segment Jekyll sees.
///
/// Lowercases, drops everything that is neither alphanumeric nor whitespace,
/// turns each whitespace character into `-` and keeps the first
/// [`MAX_SLUG_CHARS`] characters. Runs of punctuation between words therefore
/// leave double hyphens behind, which is intentional: existing post URLs
/// depend on it.
///
/// Lowercasing happens before filtering. Some capitals lowercase to more than
/// one character (`İ` becomes `i` plus a combining dot), and filtering last
/// drops the combining mark so the slug stays within its character set.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(sanitize_title("Gut Health & the GALT System!"), "gut-health--the-galt-system");
/// ```
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .take(MAX_SLUG_CHARS)
        .collect()
}
