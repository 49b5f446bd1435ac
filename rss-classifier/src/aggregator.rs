use crate::pipeline::IngestionPipeline;
use crate::traits::{ArticleStore, FeedSource, TitleClassifier};
use crate::types::{InsertOutcome, LiveSourceSpec, RefreshReport, Result};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Wires the pipeline to a store: the "refresh and display" operation.
pub struct RssClassifier {
    pipeline: IngestionPipeline,
    store: Arc<dyn ArticleStore>,
}

impl RssClassifier {
    pub fn new(
        source: Box<dyn FeedSource>,
        classifier: Arc<dyn TitleClassifier>,
        store: Arc<dyn ArticleStore>,
    ) -> Self {
        Self {
            pipeline: IngestionPipeline::new(source, classifier),
            store,
        }
    }

    /// Run the pipeline, offer every record to the store once, then read
    /// back the full stored set.
    pub async fn refresh(&self, sources: &[LiveSourceSpec]) -> Result<RefreshReport> {
        let (records, stats) = self.pipeline.run_with_stats(sources).await;

        let mut report = RefreshReport {
            stats,
            ..Default::default()
        };

        for record in &records {
            match self.store.insert_if_absent(record).await {
                InsertOutcome::Inserted => report.inserted += 1,
                InsertOutcome::DuplicateRejected => report.duplicates += 1,
                InsertOutcome::Failed(reason) => {
                    error!("Dropping article {}: {}", record.name, reason);
                    report.failed += 1;
                }
            }
        }

        if report.failed > 0 {
            warn!("{} articles could not be stored", report.failed);
        }
        info!(
            "Refresh finished: {} inserted, {} already stored, {} failed",
            report.inserted, report.duplicates, report.failed
        );

        report.articles = self.store.list_all().await?;
        Ok(report)
    }
}
