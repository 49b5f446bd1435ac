use crate::types::{AggregatorError, FetchConfig, FetchResult, Result};
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::{Client, Response};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use url::Url;

pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    /// Only absolute http(s) URLs with a host are fetched.
    pub fn validate_url(url: &str) -> Result<Url> {
        let parsed = Url::parse(url)?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host().is_none() {
            return Err(AggregatorError::UnsupportedUrl { url: url.to_string() });
        }
        Ok(parsed)
    }

    /// Fetch a feed body. Transport and HTTP failures are reported through
    /// `FetchResult::success`, never as `Err`; `Err` is reserved for a URL
    /// that cannot be requested at all.
    pub async fn fetch_feed(&self, url: &str) -> Result<FetchResult> {
        Self::validate_url(url)?;

        let start_time = Instant::now();
        let delay = Duration::from_millis(self.config.retry_delay_ms);

        debug!("Fetching feed: {}", url);

        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: delay,
            initial_interval: delay,
            max_interval: delay * 32,
            multiplier: 2.0,
            max_elapsed_time: Some(delay * 60),
            ..Default::default()
        };

        let mut last_error = None;
        let mut last_status = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                match backoff.next_backoff() {
                    Some(delay) => {
                        warn!("Attempt {} failed for {}, retrying in {:?}", attempt, url, delay);
                        tokio::time::sleep(delay).await;
                    }
                    None => break,
                }
            }

            let response = match self.send(url).await {
                Ok(response) => response,
                Err(e) => {
                    last_error = Some(e);
                    continue;
                }
            };

            let status = response.status();
            last_status = Some(status.as_u16());

            if !status.is_success() {
                last_error = Some(AggregatorError::General(format!(
                    "HTTP {}: {}",
                    status,
                    status.canonical_reason().unwrap_or("Unknown")
                )));
                continue;
            }

            match self.read_body(response).await {
                Ok(Body::Complete(content)) => {
                    info!("Fetched feed: {} ({} bytes)", url, content.len());
                    return Ok(FetchResult {
                        success: true,
                        error: None,
                        response_time_ms: start_time.elapsed().as_millis() as u64,
                        http_status: last_status,
                        content: Some(content),
                    });
                }
                Ok(Body::TooLarge) => {
                    warn!("Feed {} exceeds {}MB, discarding", url, self.config.max_feed_size_mb);
                    return Ok(FetchResult {
                        success: false,
                        error: Some(format!(
                            "Feed too large: over {}MB",
                            self.config.max_feed_size_mb
                        )),
                        response_time_ms: start_time.elapsed().as_millis() as u64,
                        http_status: last_status,
                        content: None,
                    });
                }
                Err(e) => {
                    last_error = Some(e);
                }
            }
        }

        let error_msg = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string());
        error!(
            "Failed to fetch feed after {} attempt(s): {}: {}",
            self.config.max_retries + 1,
            url,
            error_msg
        );

        Ok(FetchResult {
            success: false,
            error: Some(error_msg),
            response_time_ms: start_time.elapsed().as_millis() as u64,
            http_status: last_status,
            content: None,
        })
    }

    async fn send(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().await?;
        Ok(response)
    }

    /// Read the body chunk by chunk, stopping as soon as it passes the size
    /// limit. `Content-Length` is only a shortcut: it is absent for chunked
    /// and decompressed responses.
    async fn read_body(&self, mut response: Response) -> Result<Body> {
        let limit = self.config.max_feed_size_mb.saturating_mul(1024 * 1024) as u64;

        if response.content_length().is_some_and(|length| length > limit) {
            return Ok(Body::TooLarge);
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if (body.len() + chunk.len()) as u64 > limit {
                return Ok(Body::TooLarge);
            }
            body.extend_from_slice(&chunk);
        }
        Ok(Body::Complete(body))
    }
}

enum Body {
    Complete(Vec<u8>),
    TooLarge,
}
