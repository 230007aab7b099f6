//! Utility helpers: data path, timestamps, UTF-16 length and truncation.

use std::path::PathBuf;

/// Get the Restyle data directory (e.g. `~/.restyle/`).
pub fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".restyle")
}

/// Get current ISO 8601 timestamp.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Length of a string in UTF-16 code units, the unit browsers report for
/// text length. Characters outside the BMP (most emoji) count as 2.
pub fn text_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Keep at most `max_units` UTF-16 code units of `s`. No ellipsis is added.
///
/// Cuts only at char boundaries, so a surrogate pair straddling the limit
/// is dropped whole.
pub fn truncate_text(s: &str, max_units: usize) -> String {
    let mut units = 0;
    for (idx, ch) in s.char_indices() {
        units += ch.len_utf16();
        if units > max_units {
            return s[..idx].to_string();
        }
    }
    s.to_string()
}

/// First 8 chars of an id, for logs and responses.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate_text("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_exact_length() {
        assert_eq!(truncate_text("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate_text("hello world", 5), "hello");
    }

    #[test]
    fn test_truncate_unicode() {
        assert_eq!(truncate_text("小红书风格文案", 3), "小红书");
    }

    #[test]
    fn test_text_len_counts_utf16_units() {
        assert_eq!(text_len("小红书"), 3);
        assert_eq!(text_len("abc"), 3);
        assert_eq!(text_len("✨"), 1);
        assert_eq!(text_len("好看😍"), 4);
    }

    #[test]
    fn test_truncate_keeps_surrogate_pairs_whole() {
        assert_eq!(truncate_text("ab😍cd", 3), "ab");
        assert_eq!(truncate_text("ab😍cd", 4), "ab😍");
        assert_eq!(text_len(&truncate_text(&"🔥".repeat(10), 5)), 4);
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_data_path_ends_with_restyle() {
        assert!(get_data_path().ends_with(".restyle"));
    }

    #[test]
    fn test_timestamp_is_valid() {
        chrono::DateTime::parse_from_rfc3339(&timestamp()).unwrap();
    }
}
