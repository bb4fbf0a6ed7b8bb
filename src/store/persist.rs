//! Persistence of the content store.
//!
//! Only header metadata is stored, as a JSON list of `[id, headers]` pairs
//! sorted by id. Bodies are never persisted; indices are rebuilt on load.

use super::ContentStore;
use crate::{
    content::{ContentId, Headers, Post},
    context::RunContext,
    debug, log,
};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Failures while reading or writing the persisted store.
///
/// Any load failure means the store cannot be trusted and the caller has to
/// fall back to a full rebuild.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("malformed store data")]
    Malformed(#[source] serde_json::Error),

    #[error("could not encode store data")]
    Encode(#[source] serde_json::Error),

    #[error("store lists `{0}` more than once")]
    Duplicate(ContentId),
}

impl ContentStore {
    /// Serialize all post headers to `sink`.
    pub fn persist<W: Write>(&self, sink: W) -> Result<(), StoreError> {
        let mut items: Vec<(&ContentId, &Headers)> = self
            .posts
            .values()
            .map(|post| (&post.id, &post.headers))
            .collect();
        items.sort_unstable_by(|a, b| a.0.cmp(b.0));
        serde_json::to_writer_pretty(sink, &items).map_err(StoreError::Encode)
    }

    /// Deserialize a store from `source` and rebuild its indices.
    pub fn load<R: Read>(source: R) -> Result<Self, StoreError> {
        let items: Vec<(ContentId, Headers)> =
            serde_json::from_reader(source).map_err(StoreError::Malformed)?;

        let mut store = Self::new();
        for (id, headers) in items {
            if let Some(previous) = store.add(Post::new(id, headers)) {
                return Err(StoreError::Duplicate(previous.id));
            }
        }
        store.build_indices();
        Ok(store)
    }

    /// Load the store from a file.
    pub fn load_path(ctx: &RunContext<'_>, path: &Path) -> Result<Self, StoreError> {
        log!(ctx; "store"; "loading `{}`", path.display());
        let file = File::open(path).map_err(|err| StoreError::Io(path.to_path_buf(), err))?;
        let store = Self::load(BufReader::new(file))?;
        debug!(ctx; "store"; "{} posts, {} index keys", store.len(), store.members.len());
        Ok(store)
    }

    /// Write the store to a file atomically (temp file + rename), so a
    /// failed write never clobbers the last good store.
    pub fn write_path(&self, ctx: &RunContext<'_>, path: &Path) -> Result<(), StoreError> {
        log!(ctx; "store"; "writing {} posts to `{}`", self.len(), path.display());
        let io_err = |err| StoreError::Io(path.to_path_buf(), err);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut temp = path.as_os_str().to_owned();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        let mut writer = BufWriter::new(File::create(&temp).map_err(io_err)?);
        self.persist(&mut writer)?;
        writer.flush().map_err(io_err)?;
        drop(writer);

        fs::rename(&temp, path).map_err(io_err)
    }
}
