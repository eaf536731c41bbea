//! HTML input sanitization
//!
//! Neutralizes the characters that carry meaning in an HTML context before
//! untrusted text is embedded in markup or a mail body. The replacement set
//! follows the OWASP XSS prevention table.
//!
//! Sanitization is NOT idempotent: each call encodes every `&` it sees, so
//! running already-sanitized text through again double-escapes the entities.
//! Sanitize exactly once, at the point where untrusted input is accepted.

/// Replace HTML-significant characters with their entity encodings.
///
/// Each input character is encoded at most once per call, which is
/// equivalent to substituting `&` before the other characters. Empty input
/// yields an empty string.
///
/// # Examples
///
/// ```
/// use postern_core::sanitize::sanitize_html;
///
/// assert_eq!(sanitize_html("<script>"), "&lt;script&gt;");
/// assert_eq!(sanitize_html(""), "");
/// ```
pub fn sanitize_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#x60;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_tag_is_neutralized() {
        assert_eq!(sanitize_html("<script>"), "&lt;script&gt;");
        assert_eq!(
            sanitize_html("<img src=x onerror=\"alert(1)\">"),
            "&lt;img src=x onerror=&quot;alert(1)&quot;&gt;"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize_html(""), "");
    }

    #[test]
    fn test_all_significant_characters() {
        assert_eq!(
            sanitize_html("&<>\"'/\\`"),
            "&amp;&lt;&gt;&quot;&#x27;&#x2F;&#x5C;&#x60;"
        );
    }

    #[test]
    fn test_ampersand_encoded_before_other_entities_matter() {
        // An input ampersand never merges with an entity introduced by a
        // later substitution.
        assert_eq!(sanitize_html("a&lt;b"), "a&amp;lt;b");
    }

    #[test]
    fn test_not_idempotent() {
        let once = sanitize_html("<b>");
        let twice = sanitize_html(&once);
        assert_eq!(once, "&lt;b&gt;");
        assert_eq!(twice, "&amp;lt;b&amp;gt;");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(sanitize_html("Aloha from Graceland"), "Aloha from Graceland");
        assert_eq!(sanitize_html("café ñ 日本語"), "café ñ 日本語");
    }
}
