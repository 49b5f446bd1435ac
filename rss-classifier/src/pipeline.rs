use crate::normalizer::{entry_content, normalize_date};
use crate::traits::{FeedSource, TitleClassifier};
use crate::types::{AggregatorError, ArticleRecord, LiveSourceSpec, RawEntry, Result, RunStats};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fetch → normalize → classify, one source at a time.
///
/// Failures are contained at two levels: a source that cannot be pulled
/// contributes nothing, and an entry that cannot be turned into a record is
/// skipped. Neither stops the run.
pub struct IngestionPipeline {
    source: Box<dyn FeedSource>,
    classifier: Arc<dyn TitleClassifier>,
}

impl IngestionPipeline {
    pub fn new(source: Box<dyn FeedSource>, classifier: Arc<dyn TitleClassifier>) -> Self {
        Self { source, classifier }
    }

    pub async fn run(&self, sources: &[LiveSourceSpec]) -> Vec<ArticleRecord> {
        self.run_with_stats(sources).await.0
    }

    /// Records come out in source order, then feed order.
    pub async fn run_with_stats(&self, sources: &[LiveSourceSpec]) -> (Vec<ArticleRecord>, RunStats) {
        let mut stats = RunStats::default();
        let mut records = Vec::new();

        for source in sources {
            stats.sources_attempted += 1;

            let entries = match self.source.pull(source).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Skipping source {}: {}", source.uri, e);
                    stats.sources_failed += 1;
                    continue;
                }
            };

            debug!("Source {} yielded {} entries", source.uri, entries.len());

            for entry in &entries {
                stats.entries_seen += 1;
                match self.build_record(entry) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        warn!(
                            "Skipping entry {:?} from {}: {}",
                            entry.title.as_deref().unwrap_or("<untitled>"),
                            source.uri,
                            e
                        );
                        stats.entries_skipped += 1;
                    }
                }
            }
        }

        stats.records_emitted = records.len();
        info!(
            "Pipeline run: {} records from {}/{} sources ({} entries skipped)",
            stats.records_emitted,
            stats.sources_attempted - stats.sources_failed,
            stats.sources_attempted,
            stats.entries_skipped
        );

        (records, stats)
    }

    /// Entries without a title or link are rejected: the title is the
    /// dedupe key and the link column is required.
    pub fn build_record(&self, entry: &RawEntry) -> Result<ArticleRecord> {
        let name = entry
            .title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .ok_or(AggregatorError::MissingField { field: "title" })?;

        let link = entry
            .link
            .as_deref()
            .filter(|link| !link.trim().is_empty())
            .ok_or(AggregatorError::MissingField { field: "link" })?;

        let content = entry_content(entry);
        let date = normalize_date(entry);
        let category = self.classifier.classify(name)?;
        if !self.classifier.labels().contains(&category) {
            return Err(AggregatorError::General(format!(
                "classifier returned unknown label {:?}",
                category
            )));
        }

        Ok(ArticleRecord {
            name: name.to_string(),
            content,
            link: link.to_string(),
            date,
            category,
        })
    }
}
