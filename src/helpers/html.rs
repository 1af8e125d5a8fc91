//! HTML helper functions

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// An explicit URL scheme such as `https:` or `mailto:`
    static ref SCHEME: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").unwrap();
}

/// Whether a link target carries an explicit scheme
///
/// Such links leave the site and open in a new browsing context.
///
/// # Examples
/// ```ignore
/// is_external("https://example.com") // -> true
/// is_external("/blog/hello")         // -> false
/// ```
pub fn is_external(href: &str) -> bool {
    SCHEME.is_match(href.trim())
}

/// Schemes a link may use
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Whether a link target may be rendered as a live link
///
/// Relative targets are always allowed; absolute ones only with an
/// [`ALLOWED_SCHEMES`] scheme. Whitespace and control characters are ignored
/// when reading the scheme, as browsers do.
pub fn is_safe_href(href: &str) -> bool {
    let compact: String = href
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();

    match SCHEME.find(&compact) {
        Some(m) => {
            let scheme = &compact[..m.end() - 1];
            ALLOWED_SCHEMES
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(scheme))
        }
        None => true,
    }
}

/// Generate an anchor tag around already-rendered inner HTML
pub fn link_to(href: &str, inner_html: &str) -> String {
    if is_external(href) {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
            html_escape(href),
            inner_html
        )
    } else {
        format!(r#"<a href="{}">{}</a>"#, html_escape(href), inner_html)
    }
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Strip HTML tags from a string
pub fn strip_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

/// Truncate a string to a number of characters
pub fn truncate(s: &str, length: usize, omission: Option<&str>) -> String {
    let omission = omission.unwrap_or("...");

    if s.chars().count() <= length {
        s.to_string()
    } else {
        let truncated: String = s
            .chars()
            .take(length.saturating_sub(omission.chars().count()))
            .collect();
        format!("{}{}", truncated.trim_end(), omission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_external() {
        assert!(is_external("https://example.com"));
        assert!(is_external("http://example.com/a?b=c"));
        assert!(is_external("mailto:me@example.com"));
        assert!(!is_external("/blog/post"));
        assert!(!is_external("#section"));
        assert!(!is_external("//cdn.example.com/x.js"));
        assert!(!is_external("relative/path"));
    }

    #[test]
    fn test_is_safe_href() {
        assert!(is_safe_href("https://example.com"));
        assert!(is_safe_href("HTTP://example.com"));
        assert!(is_safe_href("mailto:me@example.com"));
        assert!(is_safe_href("tel:+15551234"));
        assert!(is_safe_href("/blog/post"));
        assert!(is_safe_href("#section"));
        assert!(!is_safe_href("javascript:alert(1)"));
        assert!(!is_safe_href("  JavaScript:alert(1)"));
        assert!(!is_safe_href("java\tscript:alert(1)"));
        assert!(!is_safe_href("data:text/html;base64,AAAA"));
        assert!(!is_safe_href("vbscript:msgbox"));
    }

    #[test]
    fn test_link_to() {
        assert_eq!(
            link_to("https://x.dev", "X"),
            r#"<a href="https://x.dev" target="_blank" rel="noopener noreferrer">X</a>"#
        );
        assert_eq!(link_to("/about", "About"), r#"<a href="/about">About</a>"#);
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Hello <b>World</b></p>"), "Hello World");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello World", 8, None), "Hello...");
        assert_eq!(truncate("Hi", 10, None), "Hi");
    }
}
