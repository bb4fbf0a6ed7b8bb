//! `[base]` section configuration.
//!
//! Site metadata handed to the external templating step with every manifest.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[base]` section in sprig.toml - basic site metadata.
///
/// # Example
/// ```toml
/// [base]
/// title = "My Blog"
/// author = "Alice"
/// url = "https://myblog.com"
/// media_url = "https://myblog.com/static/media"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BaseConfig {
    /// Blog title used by the blog and feed templates.
    #[serde(default = "defaults::base::title")]
    #[educe(Default = defaults::base::title())]
    pub title: String,

    /// Author name for the feed.
    #[serde(default = "defaults::base::author")]
    #[educe(Default = defaults::base::author())]
    pub author: String,

    /// Absolute URL prefix of the deployed site.
    #[serde(default = "defaults::base::url")]
    #[educe(Default = defaults::base::url())]
    pub url: Option<String>,

    /// URL prefix for directory-local media references.
    #[serde(default = "defaults::base::media_url")]
    #[educe(Default = defaults::base::media_url())]
    pub media_url: Option<String>,
}
