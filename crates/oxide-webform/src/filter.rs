//! Filters applied to submitted values before forms hand them out.

use std::sync::Arc;

/// Transforms every submitted string value.
pub trait EncodingFilter: Send + Sync {
    /// Returns the filtered value.
    fn filter(&self, value: &str) -> String;
}

impl<F> EncodingFilter for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn filter(&self, value: &str) -> String {
        self(value)
    }
}

/// Shared handle to a filter.
pub type SharedFilter = Arc<dyn EncodingFilter>;

/// Strips leading and trailing whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimFilter;

impl EncodingFilter for TrimFilter {
    fn filter(&self, value: &str) -> String {
        value.trim().to_string()
    }
}

/// Escapes HTML special characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlEscapeFilter;

impl EncodingFilter for HtmlEscapeFilter {
    fn filter(&self, value: &str) -> String {
        html_escape(value)
    }
}

/// Escapes HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
        assert_eq!(html_escape("\"quoted\""), "&quot;quoted&quot;");
    }

    #[test]
    fn test_closure_filter() {
        let upper = |value: &str| value.to_uppercase();
        assert_eq!(upper.filter("abc"), "ABC");
        assert_eq!(TrimFilter.filter("  x "), "x");
        assert_eq!(HtmlEscapeFilter.filter("<b>"), "&lt;b&gt;");
    }
}
