pub mod defs;

pub use defs::{ArticleRecord, InsertOutcome, LiveSourceSpec, RawEntry};
