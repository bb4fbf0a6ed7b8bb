use super::{PlanError, Planned, RenderPlan, RenderTarget};
use crate::{
    content::Post,
    context::RunContext,
    debug,
    store::{ContentStore, IndexKey},
    utils::scan::SourceScan,
};
use std::collections::BTreeSet;

/// Plan a full rebuild from a source scan into a fresh store.
///
/// Renders every page, every post, every non-empty bucket and the three
/// aggregates. Never deletes anything.
pub fn plan_rebuild(ctx: &RunContext<'_>, scan: SourceScan) -> Result<Planned, PlanError> {
    let mut store = ContentStore::new();
    for file in scan.posts {
        store.add(Post::from_bytes(file.id, &file.bytes)?);
    }
    store.build_indices();

    let mut render: BTreeSet<RenderTarget> = scan.pages.into_iter().map(RenderTarget::page).collect();
    render.extend(store.posts().map(RenderTarget::post));
    render.extend(store.index_keys().cloned().map(RenderTarget::Index));
    render.extend(IndexKey::aggregates().map(RenderTarget::Index));

    debug!(ctx; "plan"; "rebuild: {} posts, {} targets", store.len(), render.len());

    let plan = RenderPlan::assemble(render, BTreeSet::new(), &store, &ctx.config.build);
    Ok(Planned { plan, store })
}
