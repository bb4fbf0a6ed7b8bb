//! Invalidation planning.
//!
//! Given either a full source scan ([`plan_rebuild`]) or one batch of change
//! records ([`plan_update`]), decide which outputs must be rendered and
//! which must be deleted. Both planners take the store by value and hand
//! it back inside [`Planned`]: a store that failed mid-plan is dropped,
//! never reused.
//!
//! When incremental reasoning cannot be trusted the update planner
//! returns [`PlanError::NeedsRebuild`] and produces no plan at all.

mod classify;
mod rebuild;
mod target;
mod update;

pub use classify::{ChangeClassifier, Effect};
pub use rebuild::plan_rebuild;
pub use target::{Listing, RenderTarget};
pub use update::plan_update;

use crate::{
    config::BuildConfig,
    content::{ContentError, ContentId},
    store::{ContentStore, StoreError},
};
use std::collections::BTreeSet;
use thiserror::Error;

/// Why an incremental update had to be abandoned.
#[derive(Debug, Error)]
pub enum RebuildReason {
    #[error("content store could not be loaded")]
    StoreCorrupt(#[source] StoreError),

    #[error("template `{0}` changed")]
    StructuralInvalidation(String),

    #[error("`{0}` is missing from the content store")]
    StoreDrift(ContentId),
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("full rebuild required: {0}")]
    NeedsRebuild(#[from] RebuildReason),

    #[error(transparent)]
    Content(#[from] ContentError),
}

/// A target to render with its listing resolved against the final store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderEntry {
    pub target: RenderTarget,
    pub listing: Listing,
}

/// Disjoint render and delete sets, both sorted by target.
#[derive(Debug, Default)]
pub struct RenderPlan {
    pub to_render: Vec<RenderEntry>,
    pub to_delete: Vec<RenderTarget>,
}

impl RenderPlan {
    /// Resolve listings for every render target from the (fresh) store.
    fn assemble(
        render: BTreeSet<RenderTarget>,
        delete: BTreeSet<RenderTarget>,
        store: &ContentStore,
        build: &BuildConfig,
    ) -> Self {
        debug_assert!(render.is_disjoint(&delete), "render and delete sets overlap");

        let to_render = render
            .into_iter()
            .map(|target| RenderEntry {
                listing: target.refresh_from(store, build),
                target,
            })
            .collect();

        Self {
            to_render,
            to_delete: delete.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_render.is_empty() && self.to_delete.is_empty()
    }

    pub fn renders(&self, target: &RenderTarget) -> bool {
        self.to_render.iter().any(|entry| &entry.target == target)
    }

    pub fn deletes(&self, target: &RenderTarget) -> bool {
        self.to_delete.contains(target)
    }

    pub fn listing(&self, target: &RenderTarget) -> Option<&Listing> {
        self.to_render
            .iter()
            .find(|entry| &entry.target == target)
            .map(|entry| &entry.listing)
    }
}

/// A plan together with the store state it was computed against.
#[derive(Debug)]
pub struct Planned {
    pub plan: RenderPlan,
    pub store: ContentStore,
}
