//! In-memory content store with derived date and tag indices.
//!
//! The store owns every known post and is the only source of the derived
//! indices. Indices are never patched: after any batch of [`add`] and
//! [`remove`] calls, [`build_indices`] recomputes all of them from scratch.
//! Querying stale indices is a programming error and trips a debug assertion.
//!
//! [`add`]: ContentStore::add
//! [`remove`]: ContentStore::remove
//! [`build_indices`]: ContentStore::build_indices

mod index;
mod persist;

pub use index::IndexKey;
pub use persist::StoreError;

use crate::content::{ContentId, Post};
use chrono::NaiveDateTime;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct ContentStore {
    posts: FxHashMap<ContentId, Post>,
    /// Bucket key -> member ids, each list in `sorted_ids` order.
    members: BTreeMap<IndexKey, Vec<ContentId>>,
    /// All post ids, newest first.
    sorted_ids: Vec<ContentId>,
    stale: bool,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a post by id, returning the replaced one.
    pub fn add(&mut self, post: Post) -> Option<Post> {
        self.stale = true;
        self.posts.insert(post.id.clone(), post)
    }

    pub fn remove(&mut self, id: &str) -> Option<Post> {
        let removed = self.posts.remove(id);
        if removed.is_some() {
            self.stale = true;
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<&Post> {
        self.posts.get(id)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Recompute every bucket and the chronological order from the current
    /// set of posts.
    ///
    /// Posts are ordered by `(created, id)` descending, so posts created in
    /// the same second fall back to reverse id order.
    pub fn build_indices(&mut self) {
        let mut order: Vec<(NaiveDateTime, &ContentId)> = self
            .posts
            .values()
            .map(|post| (post.created(), &post.id))
            .collect();
        order.sort_unstable_by(|a, b| b.cmp(a));
        let sorted_ids: Vec<ContentId> = order.into_iter().map(|(_, id)| id.clone()).collect();

        let mut members: BTreeMap<IndexKey, Vec<ContentId>> = BTreeMap::new();
        for id in &sorted_ids {
            for key in IndexKey::for_post(&self.posts[id]) {
                members.entry(key).or_default().push(id.clone());
            }
        }

        self.sorted_ids = sorted_ids;
        self.members = members;
        self.stale = false;
    }

    #[inline]
    fn assert_fresh(&self) {
        debug_assert!(
            !self.stale,
            "content store indices queried before build_indices()"
        );
    }

    /// All post ids, newest first.
    pub fn sorted_ids(&self) -> &[ContentId] {
        self.assert_fresh();
        &self.sorted_ids
    }

    /// All posts, newest first.
    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.assert_fresh();
        self.sorted_ids.iter().map(|id| &self.posts[id])
    }

    /// Every bucket key (day, month, year, tag) with at least one member.
    pub fn index_keys(&self) -> impl Iterator<Item = &IndexKey> {
        self.assert_fresh();
        self.members.keys()
    }

    /// Whether an index would list anything. Aggregates always exist.
    pub fn has_members(&self, key: &IndexKey) -> bool {
        self.assert_fresh();
        key.is_aggregate() || self.members.get(key).is_some_and(|ids| !ids.is_empty())
    }

    /// Members of a bucket, newest first. Aggregates have no bucket; use
    /// [`latest`](Self::latest) or [`tag_counts`](Self::tag_counts) instead.
    pub fn posts_for(&self, key: &IndexKey) -> Vec<&Post> {
        self.assert_fresh();
        self.members
            .get(key)
            .map(|ids| ids.iter().map(|id| &self.posts[id]).collect())
            .unwrap_or_default()
    }

    /// The `count` most recent posts.
    pub fn latest(&self, count: usize) -> Vec<&Post> {
        self.assert_fresh();
        self.sorted_ids
            .iter()
            .take(count)
            .map(|id| &self.posts[id])
            .collect()
    }

    /// Tag names with their post counts, sorted by tag name.
    pub fn tag_counts(&self) -> Vec<(String, usize)> {
        self.assert_fresh();
        self.members
            .iter()
            .filter_map(|(key, ids)| match key {
                IndexKey::Tag(name) => Some((name.clone(), ids.len())),
                _ => None,
            })
            .collect()
    }
}
