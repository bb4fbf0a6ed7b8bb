//! Keys of the derived indices.

use crate::content::Post;
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// A derived grouping of posts.
///
/// Day, month, year and tag keys map to the posts sharing that property.
/// The three aggregates (`Blog`, `Feed`, `AllTags`) are singletons that are
/// always present and are listed from the whole store instead.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKey {
    Day { year: i32, month: u32, day: u32 },
    Month { year: i32, month: u32 },
    Year { year: i32 },
    Tag(String),
    Blog,
    Feed,
    AllTags,
}

impl IndexKey {
    pub fn day(date: NaiveDate) -> Self {
        Self::Day {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn month(date: NaiveDate) -> Self {
        Self::Month {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(date: NaiveDate) -> Self {
        Self::Year { year: date.year() }
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self::Tag(name.into())
    }

    /// Every bucket key implied by a post's headers: its day, month and
    /// year plus one key per tag.
    pub fn for_post(post: &Post) -> impl Iterator<Item = IndexKey> + '_ {
        let date = post.date();
        [Self::day(date), Self::month(date), Self::year(date)]
            .into_iter()
            .chain(post.headers.tags.iter().map(|tag| Self::tag(tag.as_str())))
    }

    /// Singleton aggregates are always rendered and never deleted.
    pub const fn is_aggregate(&self) -> bool {
        matches!(self, Self::Blog | Self::Feed | Self::AllTags)
    }

    /// The three aggregates, in render order.
    pub const fn aggregates() -> [IndexKey; 3] {
        [Self::Blog, Self::Feed, Self::AllTags]
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day { year, month, day } => write!(f, "day {year:04}-{month:02}-{day:02}"),
            Self::Month { year, month } => write!(f, "month {year:04}-{month:02}"),
            Self::Year { year } => write!(f, "year {year:04}"),
            Self::Tag(name) => write!(f, "tag `{name}`"),
            Self::Blog => f.write_str("blog index"),
            Self::Feed => f.write_str("feed"),
            Self::AllTags => f.write_str("tag index"),
        }
    }
}
