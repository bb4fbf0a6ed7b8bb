//! `[build]` section configuration.
//!
//! Source roots, output location, the persisted store and listing sizes.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// `[build]` section in sprig.toml - source layout and planner settings.
///
/// Source roots (`templates`, `pages`, `posts`) stay relative to the site
/// root, because change records from git are root-relative paths too.
/// `output` and `store` are resolved against the root when loading.
///
/// # Example
/// ```toml
/// [build]
/// templates = "templates"
/// pages = "pages"
/// posts = "blog"
/// output = "deploy"
/// posts_in_blog = 10
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Template directory. Any change below it forces a full rebuild.
    #[serde(default = "defaults::build::templates")]
    #[educe(Default = defaults::build::templates())]
    pub templates: PathBuf,

    /// Static page sources.
    #[serde(default = "defaults::build::pages")]
    #[educe(Default = defaults::build::pages())]
    pub pages: PathBuf,

    /// Blog post sources.
    #[serde(default = "defaults::build::posts")]
    #[educe(Default = defaults::build::posts())]
    pub posts: PathBuf,

    /// Deploy directory receiving rendered output.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Persisted content store.
    #[serde(default = "defaults::build::store")]
    #[educe(Default = defaults::build::store())]
    pub store: PathBuf,

    /// Recognized content file extensions, including the leading dot.
    #[serde(default = "defaults::build::extensions")]
    #[educe(Default = defaults::build::extensions())]
    pub extensions: Vec<String>,

    /// Number of posts listed on the blog index.
    #[serde(default = "defaults::build::posts_in_blog")]
    #[educe(Default = defaults::build::posts_in_blog())]
    pub posts_in_blog: usize,

    /// Number of posts listed in the feed.
    #[serde(default = "defaults::build::posts_in_feed")]
    #[educe(Default = defaults::build::posts_in_feed())]
    pub posts_in_feed: usize,
}

impl BuildConfig {
    /// Check if a path names a visible file with a content extension.
    pub fn is_source_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if name.starts_with('.') {
            return false;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|known| known.strip_prefix('.') == Some(ext))
            })
    }
}

/// A source root reduced to its plain directory names, so it compares
/// equal to the prefix of a root-relative change path.
///
/// `./blog` becomes `blog`. Returns `None` for roots that are empty or that
/// leave the site root (absolute paths, `..`).
pub fn source_root(path: &Path) -> Option<PathBuf> {
    let mut root = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => root.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (!root.as_os_str().is_empty()).then_some(root)
}
