use super::{
    ChangeClassifier, Effect, PlanError, Planned, RebuildReason, RenderPlan, RenderTarget,
};
use crate::{
    change::ChangeRecord,
    content::ContentId,
    context::RunContext,
    debug,
    store::{ContentStore, IndexKey},
};
use std::collections::BTreeSet;

/// Plan an incremental update for one batch of changes.
///
/// 1. Any template change aborts the batch before anything is touched.
/// 2. Every other record is classified and applied to the store; the
///    before side of a post retires its leaf and buckets as they were
///    stored, the before side of a page retires the page.
/// 3. Indices are rebuilt once for the whole batch.
/// 4. Retired targets that still exist are re-rendered, the rest are
///    deleted unless something else renders them.
/// 5. The aggregates are always rendered.
pub fn plan_update(
    ctx: &RunContext<'_>,
    mut store: ContentStore,
    records: &[ChangeRecord],
) -> Result<Planned, PlanError> {
    let classifier = ChangeClassifier::new(&ctx.config.build);

    if let Some(record) = records.iter().find(|r| classifier.is_structural(r)) {
        return Err(RebuildReason::StructuralInvalidation(record.path.clone()).into());
    }

    let effects = records
        .iter()
        .map(|record| classifier.classify(record))
        .collect::<Result<Vec<_>, _>>()?;

    let mut retired: BTreeSet<RenderTarget> = BTreeSet::new();
    let mut render: BTreeSet<RenderTarget> = BTreeSet::new();
    let mut added: BTreeSet<ContentId> = BTreeSet::new();

    for effect in effects {
        match effect {
            Effect::Structural => unreachable!("template changes are rejected above"),
            Effect::Ignore => {}
            Effect::Page { id, retire, render: keep } => {
                let target = RenderTarget::page(id);
                if keep {
                    retired.remove(&target);
                    render.insert(target);
                } else if retire {
                    render.remove(&target);
                    retired.insert(target);
                }
            }
            Effect::Post { id, retire, add } => {
                if retire {
                    let old = store
                        .remove(&id)
                        .ok_or_else(|| RebuildReason::StoreDrift(id.clone()))?;
                    retired.extend(RenderTarget::for_post(&old));
                }
                if let Some(post) = add {
                    added.insert(post.id.clone());
                    store.add(post);
                }
            }
        }
    }

    store.build_indices();

    for id in &added {
        if let Some(post) = store.get(id) {
            render.extend(RenderTarget::for_post(post));
        }
    }
    render.extend(IndexKey::aggregates().map(RenderTarget::Index));

    let mut delete = BTreeSet::new();
    for target in retired {
        if render.contains(&target) {
            continue;
        }
        if target.is_present_in(&store) {
            render.insert(target);
        } else {
            delete.insert(target);
        }
    }

    debug!(ctx; "plan"; "update: {} records, {} to render, {} to delete",
        records.len(), render.len(), delete.len());

    let plan = RenderPlan::assemble(render, delete, &store, &ctx.config.build);
    Ok(Planned { plan, store })
}
