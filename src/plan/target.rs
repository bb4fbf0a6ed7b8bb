//! Render targets: everything the planner can ask to render or delete.
//!
//! Targets are a closed set of variants dispatched through a handful of
//! capability methods:
//!
//! | Method           | Answers                                           |
//! |------------------|---------------------------------------------------|
//! | `url_parts`      | output path below the deploy directory            |
//! | `template`       | template the external renderer should use         |
//! | `is_present_in`  | does the target still exist in the store?         |
//! | `refresh_from`   | the target's listing at the current store state   |

use crate::{
    config::{BuildConfig, source_root},
    content::{ContentId, Post, slug},
    store::{ContentStore, IndexKey},
};
use chrono::NaiveDate;
use std::{fmt, path::Path};

/// A single output artifact.
///
/// A post's identity includes its creation day because the day is part of
/// its url: re-dating a post retires the old output and renders a new one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RenderTarget {
    Page { id: ContentId },
    Post { id: ContentId, date: NaiveDate },
    Index(IndexKey),
}

/// Content listed by an index target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// Leaf targets (posts and pages) list nothing.
    Leaf,
    /// Post ids, newest first.
    Posts(Vec<ContentId>),
    /// Tag names with post counts, sorted by name.
    TagCounts(Vec<(String, usize)>),
}

impl RenderTarget {
    pub fn page(id: impl Into<ContentId>) -> Self {
        Self::Page { id: id.into() }
    }

    pub fn post(post: &Post) -> Self {
        Self::Post {
            id: post.id.clone(),
            date: post.date(),
        }
    }

    /// The post leaf followed by every bucket the post belongs to.
    pub fn for_post(post: &Post) -> impl Iterator<Item = RenderTarget> + '_ {
        std::iter::once(Self::post(post)).chain(IndexKey::for_post(post).map(Self::Index))
    }

    /// Path segments of the output file, relative to the deploy directory.
    pub fn url_parts(&self, build: &BuildConfig) -> Vec<String> {
        match self {
            Self::Page { id } => {
                let path = Path::new(id);
                let pages = source_root(&build.pages).unwrap_or_default();
                let relative = path.strip_prefix(&pages).unwrap_or(path);
                let mut parts: Vec<String> = relative
                    .parent()
                    .into_iter()
                    .flat_map(Path::components)
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                parts.push(format!("{}.html", slug(id)));
                parts
            }
            Self::Post { id, date } => {
                let mut parts = date_parts(*date, 3);
                parts.push(format!("{}.html", slug(id)));
                parts
            }
            Self::Index(key) => match key {
                IndexKey::Day { year, month, day } => vec![
                    format!("{year:04}"),
                    format!("{month:02}"),
                    format!("{day:02}"),
                    "index.html".into(),
                ],
                IndexKey::Month { year, month } => {
                    vec![format!("{year:04}"), format!("{month:02}"), "index.html".into()]
                }
                IndexKey::Year { year } => vec![format!("{year:04}"), "index.html".into()],
                IndexKey::Tag(name) => vec!["tags".into(), format!("{name}.html")],
                IndexKey::AllTags => vec!["tags".into(), "index.html".into()],
                IndexKey::Blog => vec!["index.html".into()],
                IndexKey::Feed => vec!["feed.xml".into()],
            },
        }
    }

    /// Template file the renderer should use for this target.
    pub const fn template(&self) -> &'static str {
        match self {
            Self::Page { .. } => "page.html",
            Self::Post { .. } => "post.html",
            Self::Index(key) => match key {
                IndexKey::Day { .. } => "day.html",
                IndexKey::Month { .. } => "month.html",
                IndexKey::Year { .. } => "year.html",
                IndexKey::Tag(_) => "tag.html",
                IndexKey::AllTags => "tags.html",
                IndexKey::Blog => "blog.html",
                IndexKey::Feed => "feed.xml",
            },
        }
    }

    /// Whether the target still has something to render at the current
    /// store state. A post must be known with the same day. Pages are not
    /// tracked by the store, so only the change that touched them decides.
    pub fn is_present_in(&self, store: &ContentStore) -> bool {
        match self {
            Self::Page { .. } => false,
            Self::Post { id, date } => store.get(id).is_some_and(|post| post.date() == *date),
            Self::Index(key) => store.has_members(key),
        }
    }

    /// Recompute the target's listing from the store.
    pub fn refresh_from(&self, store: &ContentStore, build: &BuildConfig) -> Listing {
        let ids = |posts: Vec<&Post>| posts.into_iter().map(|p| p.id.clone()).collect();
        match self {
            Self::Page { .. } | Self::Post { .. } => Listing::Leaf,
            Self::Index(IndexKey::Blog) => Listing::Posts(ids(store.latest(build.posts_in_blog))),
            Self::Index(IndexKey::Feed) => Listing::Posts(ids(store.latest(build.posts_in_feed))),
            Self::Index(IndexKey::AllTags) => Listing::TagCounts(store.tag_counts()),
            Self::Index(key) => Listing::Posts(ids(store.posts_for(key))),
        }
    }
}

impl fmt::Display for RenderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page { id } => write!(f, "page `{id}`"),
            Self::Post { id, date } => write!(f, "post `{id}` ({date})"),
            Self::Index(key) => key.fmt(f),
        }
    }
}

/// Zero-padded year/month/day segments, truncated to `depth`.
fn date_parts(date: NaiveDate, depth: usize) -> Vec<String> {
    let formatted = date.format("%Y/%m/%d").to_string();
    formatted.split('/').take(depth).map(str::to_owned).collect()
}
