use crate::types::{ArticleRecord, InsertOutcome, LiveSourceSpec, RawEntry, Result};
use async_trait::async_trait;

/// Trait for pulling raw entries from a feed source
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and parse one source. A single attempt per call; callers decide
    /// what an error means for the rest of the run.
    async fn pull(&self, source: &LiveSourceSpec) -> Result<Vec<RawEntry>>;
}

/// Maps a headline to one of a fixed set of topic labels.
pub trait TitleClassifier: Send + Sync {
    fn classify(&self, title: &str) -> Result<String>;

    /// Every label `classify` can return.
    fn labels(&self) -> &[String];
}

/// Durable article storage keyed on `ArticleRecord::name`.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn insert_if_absent(&self, record: &ArticleRecord) -> InsertOutcome;

    /// All stored records in insertion order.
    async fn list_all(&self) -> Result<Vec<ArticleRecord>>;
}
