use crate::types::{AggregatorError, RawEntry, Result};
use feed_rs::parser;
use tracing::{debug, info};

/// Turns RSS / Atom / JSON Feed bodies into `RawEntry` values without
/// deciding anything about missing fields.
#[derive(Debug, Default)]
pub struct FeedParser;

impl FeedParser {
    pub fn new() -> Self {
        Self
    }

    /// `content` is the raw body; the XML declaration decides its encoding.
    pub fn parse_feed(&self, content: &[u8]) -> Result<Vec<RawEntry>> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content)
            .map_err(|e| AggregatorError::Parse(format!("Failed to parse feed: {}", e)))?;

        let entries: Vec<RawEntry> = feed.entries.into_iter().map(Self::parse_entry).collect();

        info!("Parsed feed with {} entries", entries.len());
        Ok(entries)
    }

    fn parse_entry(entry: feed_rs::model::Entry) -> RawEntry {
        let title = entry.title.map(|t| t.content);
        let link = entry.links.first().map(|l| l.href.clone());

        // Summary first; fall back to the full content body.
        let summary = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body))
            .map(|s| Self::normalize_line_endings(&s));

        RawEntry {
            title,
            summary,
            link,
            published: entry.published,
        }
    }

    /// Line endings are normalized so paragraph splitting sees `\n\n`.
    pub fn normalize_line_endings(content: &str) -> String {
        content.replace("\r\n", "\n").replace('\r', "\n")
    }
}
