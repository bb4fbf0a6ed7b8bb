//! Raw source documents: a header block, a blank line, then the body.

use std::collections::BTreeMap;

/// Separates the header block from the body.
pub const HEADER_BODY_SEPARATOR: &str = "\n\n";

/// A source file split into raw header values and body text.
///
/// Header keys are lower-cased; values are trimmed but otherwise untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl Document {
    /// Split text into headers and body.
    ///
    /// Returns `None` when there is no blank line after the header block.
    /// Header lines without a colon are skipped.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.replace("\r\n", "\n");
        let (raw_headers, body) = text.split_once(HEADER_BODY_SEPARATOR)?;

        let headers = raw_headers
            .lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(key, value)| (key.trim().to_lowercase(), value.trim().to_owned()))
            .collect();

        Some(Self {
            headers,
            body: body.to_owned(),
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headers_and_body() {
        let doc = Document::parse("Title: Hello\nTags: a, b\n\nFirst line\n\nSecond").unwrap();

        assert_eq!(doc.get("title"), Some("Hello"));
        assert_eq!(doc.get("tags"), Some("a, b"));
        assert_eq!(doc.body, "First line\n\nSecond");
    }

    #[test]
    fn test_keys_are_lowercased_and_values_trimmed() {
        let doc = Document::parse("  TITLE :   spaced out  \n\nbody").unwrap();
        assert_eq!(doc.get("title"), Some("spaced out"));
    }

    #[test]
    fn test_value_keeps_later_colons() {
        let doc = Document::parse("Created: 2021-06-01 12:30:00\n\nbody").unwrap();
        assert_eq!(doc.get("created"), Some("2021-06-01 12:30:00"));
    }

    #[test]
    fn test_line_without_colon_is_ignored() {
        let doc = Document::parse("Title: x\njust some words\n\nbody").unwrap();
        assert_eq!(doc.headers.len(), 1);
    }

    #[test]
    fn test_crlf_line_endings() {
        let doc = Document::parse("Title: x\r\n\r\nbody").unwrap();
        assert_eq!(doc.get("title"), Some("x"));
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn test_missing_separator() {
        assert!(Document::parse("Title: x\nno body follows").is_none());
    }
}
