#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rss_classifier::types::{
    AggregatorError, ArticleRecord, InsertOutcome, LiveSourceSpec, RawEntry, Result,
};
use rss_classifier::{ArticleStore, FeedSource, LinearTextClassifier, SqliteArticleStore, TitleClassifier};
use sqlx::sqlite::SqlitePoolOptions;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, Once};

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture_classifier() -> LinearTextClassifier {
    LinearTextClassifier::load(fixture("vectorizer.json"), fixture("model.json"))
        .expect("fixture artifacts load")
}

pub fn entry(title: &str, summary: Option<&str>, link: &str) -> RawEntry {
    RawEntry {
        title: Some(title.to_string()),
        summary: summary.map(str::to_string),
        link: Some(link.to_string()),
        published: None,
    }
}

pub fn dated_entry(title: &str, link: &str) -> RawEntry {
    RawEntry {
        published: Some(Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap()),
        ..entry(title, Some("Body"), link)
    }
}

/// Feed source answering from a fixed table; unknown URIs fail.
#[derive(Default)]
pub struct StaticFeedSource {
    feeds: HashMap<String, Vec<RawEntry>>,
    pulls: Mutex<Vec<String>>,
}

impl StaticFeedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(mut self, uri: &str, entries: Vec<RawEntry>) -> Self {
        self.feeds.insert(uri.to_string(), entries);
        self
    }

    pub fn pulled(&self) -> Vec<String> {
        self.pulls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedSource for StaticFeedSource {
    async fn pull(&self, source: &LiveSourceSpec) -> Result<Vec<RawEntry>> {
        self.pulls.lock().unwrap().push(source.uri.clone());
        self.feeds
            .get(&source.uri)
            .cloned()
            .ok_or_else(|| AggregatorError::FetchFailed {
                url: source.uri.clone(),
                reason: "connection refused".to_string(),
            })
    }
}

/// Wraps a classifier and fails for titles containing `poison`.
pub struct FlakyClassifier<C> {
    pub inner: C,
    pub poison: &'static str,
}

impl<C: TitleClassifier> TitleClassifier for FlakyClassifier<C> {
    fn classify(&self, title: &str) -> Result<String> {
        if title.contains(self.poison) {
            return Err(AggregatorError::General("vectorizer blew up".to_string()));
        }
        self.inner.classify(title)
    }

    fn labels(&self) -> &[String] {
        self.inner.labels()
    }
}

/// Store whose inserts fail for names containing `poison`.
pub struct FailingStore {
    pub inner: SqliteArticleStore,
    pub poison: &'static str,
}

#[async_trait]
impl ArticleStore for FailingStore {
    async fn insert_if_absent(&self, record: &ArticleRecord) -> InsertOutcome {
        if record.name.contains(self.poison) {
            return InsertOutcome::Failed("database is locked".to_string());
        }
        self.inner.insert_if_absent(record).await
    }

    async fn list_all(&self) -> Result<Vec<ArticleRecord>> {
        self.inner.list_all().await
    }
}

pub async fn memory_store() -> SqliteArticleStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    SqliteArticleStore::from_pool(pool)
        .await
        .expect("schema created")
}

pub fn sources(uris: &[&str]) -> Vec<LiveSourceSpec> {
    uris.iter().map(|uri| LiveSourceSpec::new(*uri)).collect()
}
