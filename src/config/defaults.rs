//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// [base] Section Defaults
// ============================================================================

pub mod base {
    pub fn title() -> String {
        "my sprig blog".into()
    }

    pub fn author() -> String {
        "<YOUR_NAME>".into()
    }

    pub fn url() -> Option<String> {
        None
    }

    pub fn media_url() -> Option<String> {
        None
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn templates() -> PathBuf {
        "templates".into()
    }

    pub fn pages() -> PathBuf {
        "pages".into()
    }

    pub fn posts() -> PathBuf {
        "blog".into()
    }

    pub fn output() -> PathBuf {
        "deploy".into()
    }

    pub fn store() -> PathBuf {
        "cache.json".into()
    }

    pub fn extensions() -> Vec<String> {
        [".md", ".mkd", ".mdown", ".mkdown", ".markdown", ".html"]
            .into_iter()
            .map(Into::into)
            .collect()
    }

    pub fn posts_in_blog() -> usize {
        25
    }

    pub fn posts_in_feed() -> usize {
        50
    }
}
