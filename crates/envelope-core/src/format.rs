//! Formatting utilities

/// Truncate a string to `max_len` characters with an ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    }
}

/// Row label for the item picker, numbered from 1
pub fn numbered(index: usize, title: &str) -> String {
    format!("{}) {}", index + 1, title)
}
