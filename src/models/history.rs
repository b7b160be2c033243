//! Persisted history entry for dispatched notices.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::models::NoticeRecord;

/// One previously dispatched notice, as stored in a source's history window.
///
/// The source id is the history document's partition key and is not repeated
/// per row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Deduplication key of the dispatched notice
    pub identity: String,

    /// Notice title at dispatch time
    pub title: String,

    /// Absolute URL to the notice
    pub link: String,

    /// Publish timestamp in the reference timezone
    pub published: DateTime<FixedOffset>,
}

impl From<&NoticeRecord> for HistoryEntry {
    fn from(record: &NoticeRecord) -> Self {
        Self {
            identity: record.identity.clone(),
            title: record.title.clone(),
            link: record.link.clone(),
            published: record.published,
        }
    }
}
