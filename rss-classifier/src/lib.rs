pub mod types;
pub mod traits;
pub mod fetcher;
pub mod parser;
pub mod sources;
pub mod normalizer;
pub mod classifier;
pub mod pipeline;
pub mod store;
pub mod aggregator;
pub mod render;

pub use types::*;
pub use traits::{ArticleStore, FeedSource, TitleClassifier};
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use sources::HttpFeedSource;
pub use classifier::LinearTextClassifier;
pub use pipeline::IngestionPipeline;
pub use store::SqliteArticleStore;
pub use aggregator::RssClassifier;
