//! Site configuration management for `sprig.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                           |
//! |-------------|---------------------------------------------------|
//! | `[base]`    | Site metadata (title, author, url)                |
//! | `[build]`   | Source roots, output, store, listing sizes        |
//!
//! # Example
//!
//! ```toml
//! [base]
//! title = "My Blog"
//! url = "https://example.com"
//!
//! [build]
//! posts = "blog"
//! output = "deploy"
//! posts_in_feed = 20
//! ```

mod base;
mod build;
pub mod defaults;
mod error;

pub use base::BaseConfig;
pub use build::{BuildConfig, source_root};
pub use error::ConfigError;

use crate::cli::Cli;
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing sprig.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Basic site information
    #[serde(default)]
    pub base: BaseConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Absolute directory of a root-relative source directory.
    pub fn source_dir(&self, relative: &Path) -> PathBuf {
        self.get_root().join(relative)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .clone()
            .unwrap_or_else(|| self.get_root().to_owned());

        Self::update_option(&mut self.build.output, cli.output.as_ref());

        let root = Self::normalize_path(&root);
        self.set_root(&root);
        self.config_path = Self::normalize_path(&root.join(&cli.config));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));
        self.build.store = Self::normalize_path(&root.join(&self.build.store));

        // change records are plain root-relative paths, so `./blog` must compare as `blog`
        for dir in [
            &mut self.build.templates,
            &mut self.build.pages,
            &mut self.build.posts,
        ] {
            if let Some(root) = source_root(dir) {
                *dir = root;
            }
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration before planning
    pub fn validate(&self) -> Result<()> {
        let build = &self.build;

        let mut roots = Vec::new();
        for (field, path) in [
            ("[build.templates]", &build.templates),
            ("[build.pages]", &build.pages),
            ("[build.posts]", &build.posts),
        ] {
            let Some(root) = source_root(path) else {
                bail!(ConfigError::invalid(
                    field,
                    "must be a directory below the site root"
                ));
            };
            roots.push(root);
        }

        if roots[0] == roots[1] || roots[0] == roots[2] || roots[1] == roots[2] {
            bail!(ConfigError::invalid(
                "[build.templates], [build.pages] and [build.posts]",
                "must differ"
            ));
        }

        if build.posts_in_blog == 0 {
            bail!(ConfigError::invalid("[build.posts_in_blog]", "must be positive"));
        }
        if build.posts_in_feed == 0 {
            bail!(ConfigError::invalid("[build.posts_in_feed]", "must be positive"));
        }

        if build.extensions.is_empty() {
            bail!(ConfigError::invalid(
                "[build.extensions]",
                "must have at least one element"
            ));
        }
        if let Some(ext) = build.extensions.iter().find(|ext| !ext.starts_with('.')) {
            bail!(ConfigError::invalid(
                "[build.extensions]",
                format!("entry `{ext}` must start with a dot")
            ));
        }

        if let Some(url) = &self.base.url
            && !url.starts_with("http")
        {
            bail!(ConfigError::invalid(
                "[base.url]",
                "must start with http:// or https://"
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_str() {
        let config = SiteConfig::from_str(
            r#"
            [base]
            title = "My Blog"
            author = "Test Author"
        "#,
        )
        .unwrap();

        assert_eq!(config.base.title, "My Blog");
        assert_eq!(config.base.author, "Test Author");
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result = SiteConfig::from_str(
            r#"
            [base
            title = "My Blog"
        "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = SiteConfig::from_path(Path::new("/nonexistent/sprig.toml")).unwrap_err();
        assert!(err.to_string().contains("cannot read config file"));
    }

    #[test]
    fn test_get_root_default() {
        let config = SiteConfig::default();
        assert_eq!(config.get_root(), Path::new("./"));
    }

    #[test]
    fn test_set_root() {
        let mut config = SiteConfig::default();
        config.set_root(Path::new("/custom/path"));
        assert_eq!(config.get_root(), Path::new("/custom/path"));
        assert_eq!(
            config.source_dir(Path::new("blog")),
            PathBuf::from("/custom/path/blog")
        );
    }

    #[test]
    fn test_update_with_cli_resolves_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = Cli::parse_from(["sprig", "--root", root, "--output", "public", "rebuild"]);

        let mut config = SiteConfig::default();
        config.update_with_cli(&cli);

        let root = dir.path().canonicalize().unwrap();
        assert_eq!(config.get_root(), root);
        assert_eq!(config.config_path, root.join("sprig.toml"));
        assert_eq!(config.build.output, root.join("public"));
        assert_eq!(config.build.store, root.join("cache.json"));
        // source roots stay relative
        assert_eq!(config.build.posts, PathBuf::from("blog"));
    }

    #[test]
    fn test_update_with_cli_drops_cur_dir_from_source_roots() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = Cli::parse_from(["sprig", "--root", root, "rebuild"]);

        let mut config = SiteConfig::from_str(
            r#"
            [build]
            templates = "./templates"
            posts = "./content/./blog"
        "#,
        )
        .unwrap();
        config.update_with_cli(&cli);

        assert_eq!(config.build.templates, PathBuf::from("templates"));
        assert_eq!(config.build.posts, PathBuf::from("content/blog"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_roots_outside_site() {
        for root in ["../templates", "/abs/templates", ".", "templates/../pages"] {
            let config = SiteConfig::from_str(&format!("[build]\ntemplates = {root:?}")).unwrap();
            assert!(config.validate().is_err(), "{root}");
        }
    }

    #[test]
    fn test_validate_rejects_same_root_spelled_differently() {
        let config = SiteConfig::from_str("[build]\npages = \"./blog\"").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_default() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_shared_roots() {
        let config = SiteConfig::from_str(
            r#"
            [build]
            pages = "content"
            posts = "content"
        "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_listing() {
        let config = SiteConfig::from_str("[build]\nposts_in_feed = 0").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("posts_in_feed"));
    }

    #[test]
    fn test_validate_rejects_extension_without_dot() {
        let config = SiteConfig::from_str("[build]\nextensions = [\"md\"]").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = SiteConfig::from_str("[base]\nurl = \"example.com\"").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_top_level_field_rejection() {
        let config = r#"
            [base]
            title = "Test"

            [serve]
            port = 5277
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }
}
