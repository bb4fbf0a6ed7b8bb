//! Handing a render plan to the outside world.
//!
//! Rendering markup and templates is not this crate's job. The
//! [`ManifestPublisher`] writes, for every target to render, a JSON render
//! manifest at the target's output path: which template to use, the site
//! info, the item itself and its resolved listing. An external renderer
//! turns manifests into final pages in place.

use crate::{
    context::RunContext,
    debug,
    log,
    plan::{Listing, RenderEntry, RenderTarget},
    store::{ContentStore, IndexKey},
};
use anyhow::{Context, Result, bail};
use rustc_hash::FxHashSet;
use serde_json::{Value, json};
use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};
use walkdir::WalkDir;

/// Receives render and delete requests in plan order.
pub trait Publisher {
    fn render(&mut self, entry: &RenderEntry, store: &ContentStore) -> Result<()>;

    fn delete(&mut self, target: &RenderTarget) -> Result<()>;

    /// After a full rebuild, remove every output that `rendered` does not
    /// cover. Returns the number of removed outputs.
    fn sweep(&mut self, _rendered: &[RenderEntry]) -> Result<usize> {
        Ok(0)
    }

    /// Called once after every render and delete succeeded.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

pub struct ManifestPublisher<'a> {
    ctx: RunContext<'a>,
    pub rendered: usize,
    pub deleted: usize,
}

impl<'a> ManifestPublisher<'a> {
    pub const fn new(ctx: RunContext<'a>) -> Self {
        Self {
            ctx,
            rendered: 0,
            deleted: 0,
        }
    }

    fn output(&self) -> PathBuf {
        self.ctx.config.source_dir(&self.ctx.config.build.output)
    }

    /// Output file of a target. Every url part must be a single plain path
    /// segment, so nothing is ever written or deleted outside `output`.
    fn output_path(&self, target: &RenderTarget) -> Result<PathBuf> {
        let mut path = self.output();
        for part in target.url_parts(&self.ctx.config.build) {
            let mut components = Path::new(&part).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(_)), None) => path.push(&part),
                _ => bail!("{target} has an unsafe output path segment `{part}`"),
            }
        }
        Ok(path)
    }

    /// Site-absolute url of a target, e.g. `/2021/06/01/hello.html`.
    fn url(&self, target: &RenderTarget) -> String {
        format!("/{}", target.url_parts(&self.ctx.config.build).join("/"))
    }

    fn manifest(&self, entry: &RenderEntry, store: &ContentStore) -> Value {
        let base = &self.ctx.config.base;
        let target = &entry.target;

        let item = match target {
            RenderTarget::Page { id } => json!({ "source": id }),
            RenderTarget::Post { id, .. } => match store.get(id) {
                Some(post) => json!({ "source": id, "headers": post.headers, "body": post.body }),
                None => json!({ "source": id }),
            },
            RenderTarget::Index(key) => json!({ "index": key.to_string() }),
        };

        let listing = match &entry.listing {
            Listing::Leaf => Value::Null,
            Listing::Posts(ids) => ids
                .iter()
                .filter_map(|id| store.get(id))
                .map(|post| {
                    json!({
                        "source": post.id,
                        "url": self.url(&RenderTarget::post(post)),
                        "headers": post.headers,
                    })
                })
                .collect(),
            Listing::TagCounts(counts) => counts
                .iter()
                .map(|(name, count)| {
                    json!({
                        "tag": name,
                        "count": count,
                        "url": self.url(&RenderTarget::Index(IndexKey::tag(name.as_str()))),
                    })
                })
                .collect(),
        };

        json!({
            "template": target.template(),
            "url": self.url(target),
            "site": {
                "title": base.title,
                "author": base.author,
                "url": base.url,
                "media_url": base.media_url,
            },
            "item": item,
            "listing": listing,
        })
    }
}

impl Publisher for ManifestPublisher<'_> {
    fn render(&mut self, entry: &RenderEntry, store: &ContentStore) -> Result<()> {
        let path = self.output_path(&entry.target)?;
        debug!(self.ctx; "render"; "{} -> {}", entry.target, path.display());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let manifest = serde_json::to_string_pretty(&self.manifest(entry, store))?;
        fs::write(&path, manifest)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        self.rendered += 1;
        Ok(())
    }

    fn delete(&mut self, target: &RenderTarget) -> Result<()> {
        let path = self.output_path(target)?;
        match fs::remove_file(&path) {
            Ok(()) => debug!(self.ctx; "delete"; "{}", path.display()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(self.ctx; "delete"; "{} already gone", path.display());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to delete {}", path.display()));
            }
        }
        self.deleted += 1;
        Ok(())
    }

    /// Hidden entries (`.git`, `.nojekyll`, ...) belong to the deployment
    /// and are left alone.
    fn sweep(&mut self, rendered: &[RenderEntry]) -> Result<usize> {
        let keep = rendered
            .iter()
            .map(|entry| self.output_path(&entry.target))
            .collect::<Result<FxHashSet<_>>>()?;

        let stale: Vec<PathBuf> = WalkDir::new(self.output())
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|path| !keep.contains(path))
            .collect();

        for path in &stale {
            fs::remove_file(path).with_context(|| format!("Failed to delete {}", path.display()))?;
            debug!(self.ctx; "delete"; "stale {}", path.display());
        }
        self.deleted += stale.len();
        Ok(stale.len())
    }

    fn finish(&mut self) -> Result<()> {
        let pruned = prune_empty_dirs(&self.output())?;
        if pruned > 0 {
            debug!(self.ctx; "delete"; "pruned {pruned} empty directories");
        }
        log!(self.ctx; "publish"; "{} rendered, {} deleted", self.rendered, self.deleted);
        Ok(())
    }
}

/// Remove every empty directory below `root`, deepest first. `root` itself
/// is kept.
pub fn prune_empty_dirs(root: &Path) -> Result<usize> {
    if !root.is_dir() {
        return Ok(0);
    }

    let dirs: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(walkdir::DirEntry::into_path)
        .collect();

    let mut pruned = 0;
    for dir in dirs {
        let is_empty = fs::read_dir(&dir)
            .with_context(|| format!("Failed to read {}", dir.display()))?
            .next()
            .is_none();
        if is_empty {
            fs::remove_dir(&dir).with_context(|| format!("Failed to remove {}", dir.display()))?;
            pruned += 1;
        }
    }
    Ok(pruned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::SiteConfig,
        logger::Logger,
        plan::plan_rebuild,
        utils::scan::{SourceFile, SourceScan},
    };
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn config_for(output: &Path) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.base.title = "Notes".into();
        config.build.output = output.to_path_buf();
        config
    }

    fn scan() -> SourceScan {
        SourceScan {
            pages: vec!["pages/about.md".into()],
            posts: vec![SourceFile {
                id: "blog/hello.md".into(),
                bytes: b"Title: Hello\nTags: rust\nCreated: 2021-06-01 10:00:00\n\nbody".to_vec(),
            }],
        }
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_render_writes_manifests() {
        let dir = TempDir::new().unwrap();
        let config = config_for(dir.path());
        let ctx = RunContext::new(&config, Logger::quiet());
        let planned = plan_rebuild(&ctx, scan()).unwrap();

        let mut publisher = ManifestPublisher::new(ctx);
        for entry in &planned.plan.to_render {
            publisher.render(entry, &planned.store).unwrap();
        }
        publisher.finish().unwrap();

        assert_eq!(publisher.rendered, planned.plan.to_render.len());

        let post = read_json(&dir.path().join("2021/06/01/hello.html"));
        assert_eq!(post["template"], "post.html");
        assert_eq!(post["site"]["title"], "Notes");
        assert_eq!(post["item"]["headers"]["title"], "Hello");

        let tag = read_json(&dir.path().join("tags/rust.html"));
        assert_eq!(tag["listing"][0]["url"], "/2021/06/01/hello.html");

        let tags = read_json(&dir.path().join("tags/index.html"));
        assert_eq!(tags["listing"][0]["tag"], "rust");
        assert_eq!(tags["listing"][0]["count"], 1);

        let page = read_json(&dir.path().join("about.html"));
        assert_eq!(page["item"]["source"], "pages/about.md");
        assert!(dir.path().join("feed.xml").is_file());
    }

    #[test]
    fn test_delete_and_prune() {
        let dir = TempDir::new().unwrap();
        let config = config_for(dir.path());
        let ctx = RunContext::new(&config, Logger::quiet());
        let day = dir.path().join("2021/06/01");
        fs::create_dir_all(&day).unwrap();
        fs::write(day.join("index.html"), "{}").unwrap();
        fs::write(dir.path().join("index.html"), "{}").unwrap();

        let mut publisher = ManifestPublisher::new(ctx);
        let date = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
        publisher.delete(&RenderTarget::Index(IndexKey::day(date))).unwrap();
        publisher.delete(&RenderTarget::Index(IndexKey::tag("never-rendered"))).unwrap();
        publisher.finish().unwrap();

        assert!(!dir.path().join("2021").exists());
        assert!(dir.path().join("index.html").exists());
        assert_eq!(publisher.deleted, 2);
    }

    #[test]
    fn test_unsafe_tag_never_leaves_output() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("site/deploy");
        let config = config_for(&output);
        let ctx = RunContext::new(&config, Logger::quiet());
        let store = ContentStore::new();
        let escaped = dir.path().join("escaped.html");
        fs::write(&escaped, "keep me").unwrap();

        let mut publisher = ManifestPublisher::new(ctx);
        for tag in ["../../../escaped", "/tmp/escaped"] {
            let target = RenderTarget::Index(IndexKey::tag(tag));
            let entry = RenderEntry {
                target: target.clone(),
                listing: Listing::Posts(vec![]),
            };
            assert!(publisher.render(&entry, &store).is_err(), "{tag}");
            assert!(publisher.delete(&target).is_err(), "{tag}");
        }

        assert_eq!(fs::read_to_string(&escaped).unwrap(), "keep me");
        assert!(!output.exists());
        assert_eq!(publisher.rendered, 0);
        assert_eq!(publisher.deleted, 0);
    }

    #[test]
    fn test_sweep_removes_unrendered_outputs() {
        let dir = TempDir::new().unwrap();
        let config = config_for(dir.path());
        let ctx = RunContext::new(&config, Logger::quiet());
        let planned = plan_rebuild(&ctx, scan()).unwrap();
        for (rel, content) in [
            ("2021/07/01/gone.html", "{}"),
            ("tags/travel.html", "{}"),
            (".git/HEAD", "ref"),
            (".nojekyll", ""),
        ] {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        let mut publisher = ManifestPublisher::new(ctx);
        for entry in &planned.plan.to_render {
            publisher.render(entry, &planned.store).unwrap();
        }
        let swept = publisher.sweep(&planned.plan.to_render).unwrap();
        publisher.finish().unwrap();

        assert_eq!(swept, 2);
        assert!(!dir.path().join("2021/07").exists());
        assert!(!dir.path().join("tags/travel.html").exists());
        assert!(dir.path().join("tags/rust.html").is_file());
        assert!(dir.path().join("2021/06/01/hello.html").is_file());
        assert!(dir.path().join(".git/HEAD").is_file());
        assert!(dir.path().join(".nojekyll").is_file());
    }

    #[test]
    fn test_prune_keeps_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        fs::create_dir_all(dir.path().join("keep")).unwrap();
        fs::write(dir.path().join("keep/file"), "x").unwrap();

        assert_eq!(prune_empty_dirs(dir.path()).unwrap(), 3);
        assert!(dir.path().is_dir());
        assert!(dir.path().join("keep/file").exists());
        assert_eq!(prune_empty_dirs(&dir.path().join("missing")).unwrap(), 0);
    }
}
