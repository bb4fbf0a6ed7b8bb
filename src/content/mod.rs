//! Content items: blog posts and static pages.
//!
//! Only posts carry parsed metadata; pages are tracked by id alone and only
//! ever show up directly in a render or delete set.

mod document;
mod headers;

pub use headers::Headers;

use document::Document;

use chrono::{NaiveDate, NaiveDateTime};
use std::path::{Component, Path};
use thiserror::Error;

/// Stable identifier of a content item: its source path relative to the
/// site root, `/`-separated.
pub type ContentId = String;

/// Build a [`ContentId`] from a root-relative path.
pub fn content_id(relative: &Path) -> ContentId {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Errors raised while reading a content source.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("`{id}` is not valid UTF-8")]
    Encoding { id: ContentId },

    #[error("`{id}` has no blank line between headers and body")]
    MissingBody { id: ContentId },

    #[error("`{id}` has no `created` header")]
    MissingCreated { id: ContentId },

    #[error("`{id}` has an invalid `created` header: {value:?}")]
    InvalidTimestamp { id: ContentId, value: String },
}

/// A blog post: id, header metadata and (when freshly parsed) its body.
///
/// Posts loaded from the persisted store carry no body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: ContentId,
    pub headers: Headers,
    pub body: Option<String>,
}

impl Post {
    pub fn new(id: impl Into<ContentId>, headers: Headers) -> Self {
        Self {
            id: id.into(),
            headers,
            body: None,
        }
    }

    /// Parse a post from source text.
    pub fn parse(id: impl Into<ContentId>, text: &str) -> Result<Self, ContentError> {
        let id = id.into();
        let doc = Document::parse(text).ok_or_else(|| ContentError::MissingBody { id: id.clone() })?;
        let headers = Headers::from_document(&id, &doc)?;
        Ok(Self {
            id,
            headers,
            body: Some(doc.body),
        })
    }

    /// Parse a post from raw UTF-8 bytes (a git blob or a file).
    pub fn from_bytes(id: impl Into<ContentId>, bytes: &[u8]) -> Result<Self, ContentError> {
        let id = id.into();
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::parse(id, text),
            Err(_) => Err(ContentError::Encoding { id }),
        }
    }

    #[inline]
    pub fn created(&self) -> NaiveDateTime {
        self.headers.created
    }

    /// Calendar day the post was created on; drives its url and date indices.
    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.headers.created.date()
    }
}

/// File stem of a content id, used as the output file name.
pub fn slug(id: &str) -> &str {
    Path::new(id)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_content_id_uses_forward_slashes() {
        let path: PathBuf = ["blog", "2021", "hello.md"].iter().collect();
        assert_eq!(content_id(&path), "blog/2021/hello.md");
        assert_eq!(content_id(Path::new("./pages/about.md")), "pages/about.md");
    }

    #[test]
    fn test_parse_post() {
        let post = Post::parse(
            "blog/hello.md",
            "Title: Hello\nTags: Rust\nCreated: 2021-06-01 10:00:00\n\nBody text",
        )
        .unwrap();

        assert_eq!(post.id, "blog/hello.md");
        assert_eq!(slug(&post.id), "hello");
        assert_eq!(post.date(), NaiveDate::from_ymd_opt(2021, 6, 1).unwrap());
        assert_eq!(post.body.as_deref(), Some("Body text"));
        assert!(post.headers.tags.contains("rust"));
    }

    #[test]
    fn test_parse_post_without_body_separator() {
        let err = Post::parse("blog/x.md", "Title: x").unwrap_err();
        assert!(matches!(err, ContentError::MissingBody { .. }));
    }

    #[test]
    fn test_from_bytes_rejects_invalid_utf8() {
        let err = Post::from_bytes("blog/x.md", &[0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, ContentError::Encoding { .. }));
        assert!(err.to_string().contains("blog/x.md"));
    }
}
