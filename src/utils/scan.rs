//! Full source tree scan for rebuild mode.

use crate::{
    config::SiteConfig,
    content::{ContentId, content_id},
};
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// One post source read from disk.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: ContentId,
    pub bytes: Vec<u8>,
}

/// Every page id and every post source below the configured roots, each
/// sorted by id.
#[derive(Debug, Default)]
pub struct SourceScan {
    pub pages: Vec<ContentId>,
    pub posts: Vec<SourceFile>,
}

/// Walk the page and post roots, keeping visible files with a content
/// extension. A missing root contributes nothing.
pub fn scan_sources(config: &SiteConfig) -> Result<SourceScan> {
    let root = config.get_root();
    let build = &config.build;

    let mut pages: Vec<ContentId> = collect_source_files(&config.source_dir(&build.pages), |path| {
        build.is_source_file(path)
    })
    .into_iter()
    .map(|path| relative_id(root, &path))
    .collect();

    let mut posts: Vec<SourceFile> = collect_source_files(&config.source_dir(&build.posts), |path| {
        build.is_source_file(path)
    })
    .into_iter()
    .map(|path| {
        let bytes =
            fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(SourceFile {
            id: relative_id(root, &path),
            bytes,
        })
    })
    .collect::<Result<_>>()?;

    pages.sort();
    posts.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(SourceScan { pages, posts })
}

/// Collect matching files from a directory recursively.
fn collect_source_files(dir: &Path, keep: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| keep(path.as_path()))
        .collect()
}

fn relative_id(root: &Path, path: &Path) -> ContentId {
    content_id(path.strip_prefix(root).unwrap_or(path))
}
