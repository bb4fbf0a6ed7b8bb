//! Change classification.
//!
//! | Category   | Effect                         | Example paths          |
//! |------------|--------------------------------|------------------------|
//! | Template   | abort batch, full rebuild      | `templates/post.html`  |
//! | Page       | render or delete the page      | `pages/about.md`       |
//! | Post       | remove and/or add a store item | `blog/2021/hello.md`   |
//! | Unknown    | ignored                        | `README`, `blog/.x.md` |

use crate::{
    change::ChangeRecord,
    config::{BuildConfig, source_root},
    content::{ContentError, ContentId, Post},
};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Template,
    Page,
    Post,
    Unknown,
}

/// Semantic effect of one change record.
#[derive(Debug)]
pub enum Effect {
    /// Template change; no incremental plan is possible.
    Structural,
    Ignore,
    Page {
        id: ContentId,
        retire: bool,
        render: bool,
    },
    /// `retire` removes the stored item, `add` inserts the parsed new side.
    /// A modification carries both and applies them in that order.
    Post {
        id: ContentId,
        retire: bool,
        add: Option<Post>,
    },
}

pub struct ChangeClassifier<'a> {
    build: &'a BuildConfig,
    templates: PathBuf,
    pages: PathBuf,
    posts: PathBuf,
}

impl<'a> ChangeClassifier<'a> {
    pub fn new(build: &'a BuildConfig) -> Self {
        let root = |path: &Path| source_root(path).unwrap_or_else(|| path.to_path_buf());
        Self {
            build,
            templates: root(&build.templates),
            pages: root(&build.pages),
            posts: root(&build.posts),
        }
    }

    /// Categorize a root-relative path. Template changes win over the
    /// extension filter; everything else must be a visible content file.
    pub fn categorize(&self, path: &Path) -> Category {
        if path.starts_with(&self.templates) {
            Category::Template
        } else if !self.build.is_source_file(path) {
            Category::Unknown
        } else if path.starts_with(&self.pages) {
            Category::Page
        } else if path.starts_with(&self.posts) {
            Category::Post
        } else {
            Category::Unknown
        }
    }

    pub fn is_structural(&self, record: &ChangeRecord) -> bool {
        self.categorize(Path::new(&record.path)) == Category::Template
    }

    /// Classify one record, parsing the new side of a post.
    pub fn classify(&self, record: &ChangeRecord) -> Result<Effect, ContentError> {
        let id: ContentId = record.path.clone();
        let retire = record.before.is_some();

        Ok(match self.categorize(Path::new(&record.path)) {
            Category::Template => Effect::Structural,
            Category::Unknown => Effect::Ignore,
            Category::Page => Effect::Page {
                id,
                retire,
                render: record.after.is_some(),
            },
            Category::Post => {
                let add = match &record.after {
                    Some(bytes) => Some(Post::from_bytes(id.clone(), bytes)?),
                    None => None,
                };
                Effect::Post { id, retire, add }
            }
        })
    }
}
