//! Raw change records and the sources that produce them.
//!
//! A batch is an ordered list of [`ChangeRecord`]s. Each record carries the
//! file contents before and after the change; an addition has no `before`,
//! a deletion has no `after`.

mod batch;
mod git;

pub use batch::JsonBatchSource;
pub use git::GitChangeSource;

use anyhow::Result;

/// One changed file, path relative to the site root with `/` separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub path: String,
    pub before: Option<Vec<u8>>,
    pub after: Option<Vec<u8>>,
}

impl ChangeRecord {
    pub fn added(path: impl Into<String>, after: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            before: None,
            after: Some(after.into()),
        }
    }

    pub fn deleted(path: impl Into<String>, before: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            before: Some(before.into()),
            after: None,
        }
    }

    pub fn modified(
        path: impl Into<String>,
        before: impl Into<Vec<u8>>,
        after: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            path: path.into(),
            before: Some(before.into()),
            after: Some(after.into()),
        }
    }
}

/// Produces one batch of changes.
pub trait ChangeSource {
    fn changes(&self) -> Result<Vec<ChangeRecord>>;
}
