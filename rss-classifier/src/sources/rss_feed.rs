use crate::traits::FeedSource;
use crate::types::{AggregatorError, FetchConfig, LiveSourceSpec, RawEntry, Result};
use crate::{FeedParser, Fetcher};
use async_trait::async_trait;
use tracing::{info, warn};

/// Feed source backed by HTTP + `feed-rs`.
pub struct HttpFeedSource {
    fetcher: Fetcher,
    parser: FeedParser,
}

impl HttpFeedSource {
    pub fn new(fetch_config: FetchConfig) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(fetch_config)?,
            parser: FeedParser::new(),
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn pull(&self, source: &LiveSourceSpec) -> Result<Vec<RawEntry>> {
        info!("Pulling RSS feed: {}", source.uri);

        let fetch_result = self.fetcher.fetch_feed(&source.uri).await?;

        if !fetch_result.success {
            let reason = fetch_result
                .error
                .unwrap_or_else(|| "Fetch failed".to_string());
            return Err(AggregatorError::FetchFailed {
                url: source.uri.clone(),
                reason: match fetch_result.http_status {
                    Some(status) => format!("{} (last status {})", reason, status),
                    None => reason,
                },
            });
        }

        let content = match fetch_result.content {
            Some(content) => content,
            None => {
                warn!("No content returned for RSS feed {}", source.uri);
                return Ok(Vec::new());
            }
        };

        let entries = self.parser.parse_feed(&content)?;

        info!(
            "Pulled {} entries from {} in {}ms",
            entries.len(),
            source.uri,
            fetch_result.response_time_ms
        );
        Ok(entries)
    }
}
