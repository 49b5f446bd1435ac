use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One configured feed source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiveSourceSpec {
    pub uri: String,
}

impl LiveSourceSpec {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

/// A feed item as it came off the wire. Every field is optional because
/// feeds routinely omit any of them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub link: Option<String>,
    pub published: Option<DateTime<Utc>>,
}

/// The normalized, classified article handed to persistence.
///
/// `name` is the natural key; `content` always holds exactly three
/// paragraph slots; `date` is either `YYYY-MM-DD HH:MM:SS` or the
/// "No date available" sentinel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub name: String,
    pub content: String,
    pub link: String,
    pub date: String,
    pub category: String,
}

/// Result of offering one record to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    DuplicateRejected,
    Failed(String),
}

impl InsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted)
    }
}
