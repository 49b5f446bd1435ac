use crate::types::RawEntry;

pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Every stored excerpt has exactly this many paragraph slots.
pub const PARAGRAPH_SLOTS: usize = 3;

pub const NO_DATE: &str = "No date available";

/// Used in place of a missing summary.
pub const NO_CONTENT: &str = "No content available";

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Pad or truncate `raw` to exactly three `\n\n`-separated paragraphs.
///
/// Empty input is not an error; it becomes three empty slots.
pub fn normalize_content(raw: &str) -> String {
    let mut paragraphs: Vec<&str> = raw
        .split(PARAGRAPH_SEPARATOR)
        .take(PARAGRAPH_SLOTS)
        .collect();
    paragraphs.resize(PARAGRAPH_SLOTS, "");
    paragraphs.join(PARAGRAPH_SEPARATOR)
}

/// Content for an entry, substituting the placeholder when the feed gave
/// none, then normalized.
pub fn entry_content(entry: &RawEntry) -> String {
    normalize_content(entry.summary.as_deref().unwrap_or(NO_CONTENT))
}

/// Format the structured publish time, or return the sentinel.
///
/// A raw date string the feed library could not parse is never passed
/// through; such entries get the sentinel like entries with no date.
pub fn normalize_date(entry: &RawEntry) -> String {
    match entry.published {
        Some(published) => published.format(DATE_FORMAT).to_string(),
        None => NO_DATE.to_string(),
    }
}

/// Split stored content back into its paragraph slots.
pub fn paragraphs(content: &str) -> Vec<&str> {
    content.split(PARAGRAPH_SEPARATOR).collect()
}
