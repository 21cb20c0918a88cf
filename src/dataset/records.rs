// Data models — the record types that flow through the pipeline.
//
// These are separate from the I/O helpers so the engine and the report
// modules can use them without caring where a batch came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ingested social-media record.
///
/// `content` is the only required field; engagement counts default to 0
/// when absent from the source data. Records are immutable once they
/// enter the engine — analysis appends columns, it never edits rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub username: String,
    pub timestamp: DateTime<Utc>,
    pub content: String,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub retweets: u32,
    #[serde(default)]
    pub replies: u32,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub mentions: Vec<String>,
}

impl Record {
    /// Raw engagement: likes + retweets, the popularity proxy fused into
    /// the composite signal.
    pub fn engagement_raw(&self) -> f64 {
        f64::from(self.likes) + f64::from(self.retweets)
    }
}

/// A record with its four appended signal columns.
///
/// `tfidf_signal`, `sentiment` and `engagement` are min-max normalized to
/// [0,1] within the batch; `composite_signal` is their weighted sum and
/// stays in [0,1] for any valid weight triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: Record,
    pub tfidf_signal: f64,
    pub sentiment: f64,
    pub engagement: f64,
    pub composite_signal: f64,
}
