//! Change batches extracted from the last git commit.
//!
//! The batch is the difference between the `HEAD` tree and the tree of its
//! first parent. A root commit diffs against nothing, so every file in it
//! is an addition.

use super::{ChangeRecord, ChangeSource};
use anyhow::{Context, Result, bail};
use gix::{ObjectId, Repository, traverse::tree::Recorder};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

pub struct GitChangeSource {
    root: PathBuf,
}

impl GitChangeSource {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

impl ChangeSource for GitChangeSource {
    fn changes(&self) -> Result<Vec<ChangeRecord>> {
        let repo = gix::discover(&self.root)
            .with_context(|| format!("Failed to open git repository at {}", self.root.display()))?;
        let Some(workdir) = repo.workdir() else {
            bail!("Git repository at {} has no work tree", self.root.display());
        };
        let prefix = site_prefix(workdir, &self.root)?;

        let head = repo.head_commit().context("Failed to resolve HEAD commit")?;
        let new = blob_map(&repo, Some(head.tree_id()?.detach()))?;

        let parent = head.parent_ids().next().map(|id| id.detach());
        let old = match parent {
            Some(id) => blob_map(&repo, Some(repo.find_commit(id)?.tree_id()?.detach()))?,
            None => blob_map(&repo, None)?,
        };

        diff_blob_maps(&repo, &rebase(old, &prefix), &rebase(new, &prefix))
    }
}

/// Location of `root` inside the work tree as a `/`-separated prefix.
/// Empty when the site is the work tree itself.
fn site_prefix(workdir: &Path, root: &Path) -> Result<String> {
    let canonical = |path: &Path| {
        path.canonicalize()
            .with_context(|| format!("Failed to resolve {}", path.display()))
    };
    let (workdir, root) = (canonical(workdir)?, canonical(root)?);
    let Ok(rel) = root.strip_prefix(&workdir) else {
        bail!("{} is outside the work tree {}", root.display(), workdir.display());
    };
    Ok(rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

/// Keeps only blobs under `prefix`, keyed relative to it.
fn rebase(map: BTreeMap<String, ObjectId>, prefix: &str) -> BTreeMap<String, ObjectId> {
    if prefix.is_empty() {
        return map;
    }
    map.into_iter()
        .filter_map(|(path, oid)| {
            let rel = path.strip_prefix(prefix)?.strip_prefix('/')?;
            Some((rel.to_owned(), oid))
        })
        .collect()
}

/// Every blob reachable from `tree`, keyed by its full `/`-separated path.
fn blob_map(repo: &Repository, tree: Option<ObjectId>) -> Result<BTreeMap<String, ObjectId>> {
    let Some(tree) = tree else {
        return Ok(BTreeMap::new());
    };

    let mut recorder = Recorder::default();
    repo.find_tree(tree)?
        .traverse()
        .breadthfirst(&mut recorder)
        .context("Failed to traverse commit tree")?;

    Ok(recorder
        .records
        .into_iter()
        .filter(|entry| entry.mode.is_blob())
        .map(|entry| (entry.filepath.to_string(), entry.oid))
        .collect())
}

/// Records for every path whose blob differs between the two maps, sorted by path.
fn diff_blob_maps(
    repo: &Repository,
    old: &BTreeMap<String, ObjectId>,
    new: &BTreeMap<String, ObjectId>,
) -> Result<Vec<ChangeRecord>> {
    let read = |oid: &ObjectId| -> Result<Vec<u8>> { Ok(repo.find_object(*oid)?.detach().data) };

    let mut paths: Vec<&String> = old.keys().chain(new.keys()).collect();
    paths.sort();
    paths.dedup();

    let mut records = Vec::new();
    for path in paths {
        let (before, after) = (old.get(path), new.get(path));
        if before == after {
            continue;
        }
        records.push(ChangeRecord {
            path: path.clone(),
            before: before.map(read).transpose()?,
            after: after.map(read).transpose()?,
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gix::objs::{
        Tree,
        tree::{Entry, EntryKind},
    };
    use tempfile::TempDir;

    fn blob(repo: &Repository, name: &str, content: &str) -> Entry {
        Entry {
            mode: EntryKind::Blob.into(),
            filename: name.into(),
            oid: repo.write_blob(content.as_bytes()).unwrap().detach(),
        }
    }

    fn tree(repo: &Repository, mut entries: Vec<Entry>) -> ObjectId {
        entries.sort_by(|a, b| a.filename.cmp(&b.filename));
        repo.write_object(&Tree { entries }).unwrap().detach()
    }

    fn subtree(name: &str, oid: ObjectId) -> Entry {
        Entry {
            mode: EntryKind::Tree.into(),
            filename: name.into(),
            oid,
        }
    }

    #[test]
    fn test_blob_map_uses_full_paths() {
        let dir = TempDir::new().unwrap();
        let repo = gix::init(dir.path()).unwrap();

        let blog = tree(&repo, vec![blob(&repo, "a.md", "A")]);
        let root = tree(&repo, vec![subtree("blog", blog), blob(&repo, "README", "r")]);

        let map = blob_map(&repo, Some(root)).unwrap();
        let paths: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(paths, ["README", "blog/a.md"]);
        assert!(blob_map(&repo, None).unwrap().is_empty());
    }

    #[test]
    fn test_diff_classifies_additions_deletions_and_modifications() {
        let dir = TempDir::new().unwrap();
        let repo = gix::init(dir.path()).unwrap();

        let old_blog = tree(
            &repo,
            vec![
                blob(&repo, "kept.md", "same"),
                blob(&repo, "edited.md", "v1"),
                blob(&repo, "gone.md", "bye"),
            ],
        );
        let new_blog = tree(
            &repo,
            vec![
                blob(&repo, "kept.md", "same"),
                blob(&repo, "edited.md", "v2"),
                blob(&repo, "fresh.md", "hi"),
            ],
        );
        let old = blob_map(&repo, Some(tree(&repo, vec![subtree("blog", old_blog)]))).unwrap();
        let new = blob_map(&repo, Some(tree(&repo, vec![subtree("blog", new_blog)]))).unwrap();

        let records = diff_blob_maps(&repo, &old, &new).unwrap();
        assert_eq!(
            records,
            vec![
                ChangeRecord::modified("blog/edited.md", "v1", "v2"),
                ChangeRecord::added("blog/fresh.md", "hi"),
                ChangeRecord::deleted("blog/gone.md", "bye"),
            ]
        );
    }

    #[test]
    fn test_root_commit_is_all_additions() {
        let dir = TempDir::new().unwrap();
        let repo = gix::init(dir.path()).unwrap();

        let root = tree(&repo, vec![blob(&repo, "a.md", "A"), blob(&repo, "b.md", "B")]);
        let new = blob_map(&repo, Some(root)).unwrap();

        let records = diff_blob_maps(&repo, &BTreeMap::new(), &new).unwrap();
        assert_eq!(
            records,
            vec![ChangeRecord::added("a.md", "A"), ChangeRecord::added("b.md", "B")]
        );
    }

    #[test]
    fn test_subdirectory_site_sees_paths_relative_to_itself() {
        let dir = TempDir::new().unwrap();
        let repo = gix::init(dir.path()).unwrap();
        let site = dir.path().join("site");
        std::fs::create_dir_all(site.join("blog")).unwrap();

        let blog = tree(&repo, vec![blob(&repo, "a.md", "A")]);
        let nested = tree(&repo, vec![subtree("blog", blog)]);
        let other = tree(&repo, vec![blob(&repo, "a.md", "elsewhere")]);
        let root = tree(
            &repo,
            vec![
                subtree("site", nested),
                subtree("sitemap", other),
                blob(&repo, "README", "r"),
            ],
        );

        let prefix = site_prefix(repo.workdir().unwrap(), &site).unwrap();
        assert_eq!(prefix, "site");

        let new = rebase(blob_map(&repo, Some(root)).unwrap(), &prefix);
        let records = diff_blob_maps(&repo, &BTreeMap::new(), &new).unwrap();
        assert_eq!(records, vec![ChangeRecord::added("blog/a.md", "A")]);
    }

    #[test]
    fn test_site_prefix_of_work_tree_is_empty() {
        let dir = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();

        assert_eq!(site_prefix(dir.path(), dir.path()).unwrap(), "");
        assert_eq!(site_prefix(dir.path(), &dir.path().join(".")).unwrap(), "");
        assert!(site_prefix(dir.path(), other.path()).is_err());
    }

    #[test]
    fn test_open_fails_outside_repository() {
        let dir = TempDir::new().unwrap();
        assert!(GitChangeSource::new(dir.path()).changes().is_err());
    }
}
