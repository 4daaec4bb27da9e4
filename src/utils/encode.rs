//! Percent-encoding of residual search text.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything `encodeURIComponent` escapes: all non-alphanumerics except
/// `- _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes search text for substitution into a URL template.
///
/// After encoding, `%2F` is restored to a literal `/` so placeholders that
/// stand for path segments (e.g. `owner/repo`) remain navigable. Every other
/// reserved character stays escaped.
pub fn encode_search_text(text: &str) -> String {
    utf8_percent_encode(text, COMPONENT)
        .to_string()
        .replace("%2F", "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(encode_search_text("unduck"), "unduck");
    }

    #[test]
    fn test_spaces_and_reserved_characters_are_escaped() {
        assert_eq!(encode_search_text("hello world"), "hello%20world");
        assert_eq!(encode_search_text("a&b=c"), "a%26b%3Dc");
        assert_eq!(encode_search_text("50%"), "50%25");
        assert_eq!(encode_search_text("q?x#y"), "q%3Fx%23y");
    }

    #[test]
    fn test_unreserved_marks_stay_literal() {
        assert_eq!(encode_search_text("it's-a_test.!~*()"), "it's-a_test.!~*()");
    }

    #[test]
    fn test_slashes_survive_encoding() {
        assert_eq!(encode_search_text("t3dotgg/unduck"), "t3dotgg/unduck");
        assert_eq!(encode_search_text("a/b c/d"), "a/b%20c/d");
    }

    #[test]
    fn test_unicode_is_utf8_percent_encoded() {
        assert_eq!(encode_search_text("héllo"), "h%C3%A9llo");
    }
}
