//! Post header metadata and its textual conversions.

use super::{ContentError, ContentId, Document};
use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, sync::LazyLock};

/// Format of the `created` and `updated` headers.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static TAG_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[, ]+").expect("tag separator pattern is valid"));

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).ok()
}

pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Split a comma/space separated tag string into a lower-cased set.
///
/// A tag names its output file, so path separators become `-`.
pub fn parse_tags(value: &str) -> BTreeSet<String> {
    TAG_SEPARATOR
        .split(&value.to_lowercase())
        .filter(|tag| !tag.is_empty())
        .map(|tag| tag.replace(['/', '\\'], "-"))
        .collect()
}

/// Header metadata of a blog post.
///
/// This is exactly what the persisted store keeps per post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Headers {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub tags: BTreeSet<String>,

    #[serde(with = "timestamp")]
    pub created: NaiveDateTime,

    #[serde(default, with = "timestamp::optional")]
    pub updated: Option<NaiveDateTime>,

    #[serde(default)]
    pub uuid: String,
}

impl Headers {
    /// Convert raw header values. `created` is mandatory, a malformed or
    /// missing `updated` is dropped.
    pub fn from_document(id: &ContentId, doc: &Document) -> Result<Self, ContentError> {
        let raw_created = doc
            .get("created")
            .ok_or_else(|| ContentError::MissingCreated { id: id.clone() })?;
        let created =
            parse_timestamp(raw_created).ok_or_else(|| ContentError::InvalidTimestamp {
                id: id.clone(),
                value: raw_created.to_owned(),
            })?;

        Ok(Self {
            title: doc.get("title").unwrap_or_default().to_owned(),
            tags: doc.get("tags").map(parse_tags).unwrap_or_default(),
            created,
            updated: doc.get("updated").and_then(parse_timestamp),
            uuid: doc.get("uuid").unwrap_or_default().to_owned(),
        })
    }
}

/// Serde adapters for timestamps in [`TIMESTAMP_FORMAT`].
mod timestamp {
    use super::{format_timestamp, parse_timestamp};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
    }

    pub mod optional {
        use super::{format_timestamp, parse_timestamp};
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer, de::Error};

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.serialize_some(&format_timestamp(value)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| {
                    parse_timestamp(&raw)
                        .ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
                })
                .transpose()
        }
    }
}
