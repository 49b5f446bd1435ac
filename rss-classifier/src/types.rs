// Use the interfaces crate for core types
pub use interfaces::defs::{ArticleRecord, InsertOutcome, LiveSourceSpec, RawEntry};

/// Sources pulled when no `--feed` is given.
pub const DEFAULT_FEEDS: &[&str] = &[
    "http://rss.cnn.com/rss/cnn_topstories.rss",
    "http://qz.com/feed",
    "http://feeds.foxnews.com/foxnews/politics",
    "http://feeds.reuters.com/reuters/businessNews",
    "http://feeds.feedburner.com/NewshourWorld",
    "https://feeds.bbci.co.uk/news/world/asia/india/rss.xml",
];

pub fn default_sources() -> Vec<LiveSourceSpec> {
    DEFAULT_FEEDS.iter().map(|uri| LiveSourceSpec::new(*uri)).collect()
}

#[derive(Debug, Clone)]
pub struct FetchResult {
    pub success: bool,
    pub error: Option<String>,
    pub response_time_ms: u64,
    pub http_status: Option<u16>,
    /// Undecoded body; the feed parser honours the XML encoding declaration.
    pub content: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// Extra attempts after the first one. Zero means a single attempt.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub max_feed_size_mb: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "RSS-Classifier/0.1".to_string(),
            timeout_seconds: 30,
            max_retries: 0,
            retry_delay_ms: 5_000,
            max_feed_size_mb: 10,
            max_redirects: 5,
        }
    }
}

/// Counters for a single pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub sources_attempted: usize,
    pub sources_failed: usize,
    pub entries_seen: usize,
    pub entries_skipped: usize,
    pub records_emitted: usize,
}

/// What a refresh did, plus the stored set read back afterwards.
#[derive(Debug, Clone, Default)]
pub struct RefreshReport {
    pub stats: RunStats,
    pub inserted: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub articles: Vec<ArticleRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unsupported feed URL: {url}")]
    UnsupportedUrl { url: String },

    #[error("Fetch failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Entry is missing its {field}")]
    MissingField { field: &'static str },

    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("General error: {0}")]
    General(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("failed to read artifact {path}: {source}")]
    ArtifactIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode artifact {path}: {source}")]
    ArtifactFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("artifact shape mismatch: {0}")]
    Shape(String),

    #[error("classifier has no labels")]
    NoLabels,
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
