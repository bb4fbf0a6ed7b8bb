//! Explicit per-run context: configuration plus logger handle.

use crate::{config::SiteConfig, logger::Logger};

/// Everything a single planning run needs besides its inputs.
///
/// Exactly one run is in flight at a time; the context is cheap to copy and
/// is threaded through the store, the classifier and the planner.
#[derive(Debug, Clone, Copy)]
pub struct RunContext<'a> {
    pub config: &'a SiteConfig,
    logger: Logger,
}

impl<'a> RunContext<'a> {
    pub const fn new(config: &'a SiteConfig, logger: Logger) -> Self {
        Self { config, logger }
    }

    #[inline]
    pub const fn logger(&self) -> &Logger {
        &self.logger
    }
}
