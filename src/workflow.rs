//! Run orchestration: plan, publish, then commit the store.
//!
//! The persisted store is only replaced after every delete and render of
//! the plan succeeded. An update that cannot be planned incrementally is
//! answered with a full rebuild.

use crate::{
    change::ChangeSource,
    context::RunContext,
    log,
    plan::{PlanError, Planned, RebuildReason, RenderPlan, plan_rebuild, plan_update},
    publish::{ManifestPublisher, Publisher},
    store::ContentStore,
    utils::scan::scan_sources,
};
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Rebuild,
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub mode: Mode,
    pub posts: usize,
    pub rendered: usize,
    pub deleted: usize,
}

pub struct Workflow<'a, P> {
    ctx: RunContext<'a>,
    publisher: P,
}

impl<'a> Workflow<'a, ManifestPublisher<'a>> {
    pub const fn new(ctx: RunContext<'a>) -> Self {
        Self {
            ctx,
            publisher: ManifestPublisher::new(ctx),
        }
    }
}

impl<'a, P: Publisher> Workflow<'a, P> {
    pub const fn with_publisher(ctx: RunContext<'a>, publisher: P) -> Self {
        Self { ctx, publisher }
    }

    fn store_path(&self) -> PathBuf {
        self.ctx.config.source_dir(&self.ctx.config.build.store)
    }

    /// Scan the whole source tree and render everything into a fresh store.
    pub fn rebuild(&mut self) -> Result<RunSummary> {
        let planned = self.plan_rebuild()?;
        self.publish(planned, Mode::Rebuild)
    }

    /// Render only what one change batch touched, falling back to
    /// [`rebuild`](Self::rebuild) when incremental planning is unsafe.
    pub fn update(&mut self, source: &dyn ChangeSource) -> Result<RunSummary> {
        match self.try_update(source)? {
            Ok(planned) => self.publish(planned, Mode::Update),
            Err(reason) => {
                log!(self.ctx; "warn"; "{reason}, issuing full rebuild");
                self.rebuild()
            }
        }
    }

    /// Dry run: compute a plan without touching the output or the store.
    pub fn plan(&self, source: Option<&dyn ChangeSource>) -> Result<(Mode, RenderPlan)> {
        if let Some(source) = source {
            match self.try_update(source)? {
                Ok(planned) => return Ok((Mode::Update, planned.plan)),
                Err(reason) => log!(self.ctx; "warn"; "{reason}, planning full rebuild"),
            }
        }
        Ok((Mode::Rebuild, self.plan_rebuild()?.plan))
    }

    fn plan_rebuild(&self) -> Result<Planned> {
        let scan = scan_sources(self.ctx.config)?;
        Ok(plan_rebuild(&self.ctx, scan)?)
    }

    /// Plan an update. The inner error carries the reason a rebuild is
    /// required; the outer one is fatal.
    fn try_update(&self, source: &dyn ChangeSource) -> Result<Result<Planned, RebuildReason>> {
        let records = source.changes().context("Failed to collect changes")?;
        log!(self.ctx; "update"; "{} changed files", records.len());

        let store = match ContentStore::load_path(&self.ctx, &self.store_path()) {
            Ok(store) => store,
            Err(err) => return Ok(Err(RebuildReason::StoreCorrupt(err))),
        };

        match plan_update(&self.ctx, store, &records) {
            Ok(planned) => Ok(Ok(planned)),
            Err(PlanError::NeedsRebuild(reason)) => Ok(Err(reason)),
            Err(err) => Err(err.into()),
        }
    }

    fn publish(&mut self, planned: Planned, mode: Mode) -> Result<RunSummary> {
        let Planned { plan, store } = planned;

        for target in &plan.to_delete {
            self.publisher.delete(target)?;
        }
        for entry in &plan.to_render {
            self.publisher.render(entry, &store)?;
        }
        // a rebuild never plans deletions, so outputs of vanished sources are swept here
        let swept = match mode {
            Mode::Rebuild => self.publisher.sweep(&plan.to_render)?,
            Mode::Update => 0,
        };
        self.publisher.finish()?;

        store
            .write_path(&self.ctx, &self.store_path())
            .context("Failed to persist content store")?;

        Ok(RunSummary {
            mode,
            posts: store.len(),
            rendered: plan.to_render.len(),
            deleted: plan.to_delete.len() + swept,
        })
    }
}
