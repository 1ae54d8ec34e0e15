/// Collapses every run of whitespace (including `\r` and `\n`) into a single
/// space and trims both ends.
///
/// # Examples
///
/// ```
/// use takup_utils::string::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("  a\r\nb \t c\n"), "a b c");
/// ```
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns the last `.`-separated segment of a reverse-domain identifier.
pub fn last_segment(identifier: &str) -> &str {
    identifier.rsplit('.').next().unwrap_or(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace_line_breaks() {
        assert_eq!(collapse_whitespace("line1\nline2\r\nline3"), "line1 line2 line3");
    }

    #[test]
    fn test_collapse_whitespace_runs_and_trim() {
        assert_eq!(collapse_whitespace("  many   spaces\t\there  "), "many spaces here");
        assert_eq!(collapse_whitespace(""), "");
        assert_eq!(collapse_whitespace(" \n\r\t "), "");
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("com.atakmap.android.datasync.plugin"), "plugin");
        assert_eq!(last_segment("noseparator"), "noseparator");
        assert_eq!(last_segment("trailing."), "");
    }
}
