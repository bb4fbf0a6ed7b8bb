//! Change batches read from a JSON file.
//!
//! ```json
//! [
//!   { "path": "blog/hello.md", "after": "Title: Hello\n..." },
//!   { "path": "pages/old.md", "before": "Title: Old\n..." }
//! ]
//! ```

use super::{ChangeRecord, ChangeSource};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRecord {
    path: String,
    #[serde(default)]
    before: Option<String>,
    #[serde(default)]
    after: Option<String>,
}

impl From<RawRecord> for ChangeRecord {
    fn from(raw: RawRecord) -> Self {
        Self {
            path: raw.path,
            before: raw.before.map(String::into_bytes),
            after: raw.after.map(String::into_bytes),
        }
    }
}

pub struct JsonBatchSource {
    path: PathBuf,
}

impl JsonBatchSource {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    fn parse(content: &str) -> Result<Vec<ChangeRecord>> {
        let records: Vec<RawRecord> = serde_json::from_str(content)?;
        Ok(records.into_iter().map(ChangeRecord::from).collect())
    }
}

impl ChangeSource for JsonBatchSource {
    fn changes(&self) -> Result<Vec<ChangeRecord>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read change batch {}", self.path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Malformed change batch {}", self.path.display()))
    }
}
