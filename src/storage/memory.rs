// src/storage/memory.rs

//! In-memory history backend.
//!
//! Used directly in tests and as the degraded-mode fallback behind
//! `HistoryService`. Same window semantics as the filesystem backend.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::HistoryEntry;
use crate::storage::{HistoryStore, merge_entries};

/// History store backed by a per-source map.
pub struct MemoryHistory {
    windows: RwLock<HashMap<String, Vec<HistoryEntry>>>,
    retention: usize,
}

impl MemoryHistory {
    pub fn new(retention: usize) -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            retention,
        }
    }
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn load(&self, source_id: &str) -> Result<Vec<HistoryEntry>> {
        let windows = self.windows.read().await;
        Ok(windows.get(source_id).cloned().unwrap_or_default())
    }

    async fn record(&self, source_id: &str, entries: &[HistoryEntry]) -> Result<()> {
        let mut windows = self.windows.write().await;
        let existing = windows.remove(source_id).unwrap_or_default();
        windows.insert(
            source_id.to_string(),
            merge_entries(existing, entries, self.retention),
        );
        Ok(())
    }

    async fn replace_all(&self, source_id: &str, entries: &[HistoryEntry]) -> Result<()> {
        let mut windows = self.windows.write().await;
        windows.insert(
            source_id.to_string(),
            merge_entries(Vec::new(), entries, self.retention),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};

    use super::*;

    fn entry(identity: &str, day: u32) -> HistoryEntry {
        let kst = FixedOffset::east_opt(9 * 3600).unwrap();
        HistoryEntry {
            identity: identity.to_string(),
            title: format!("Notice {identity}"),
            link: format!("https://example.ac.kr/notice.do?articleNo={identity}"),
            published: kst.with_ymd_and_hms(2025, 4, day, 9, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn record_upserts_by_identity() {
        let store = MemoryHistory::new(30);
        store.record("sw_notice", &[entry("123", 1)]).await.unwrap();
        store
            .record("sw_notice", &[entry("123", 1), entry("124", 2)])
            .await
            .unwrap();

        let loaded = store.load("sw_notice").await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].identity, "124");
    }

    #[tokio::test]
    async fn replace_all_swaps_the_window() {
        let store = MemoryHistory::new(30);
        store.record("sw_notice", &[entry("old", 1)]).await.unwrap();
        store
            .replace_all("sw_notice", &[entry("new", 2)])
            .await
            .unwrap();

        let loaded = store.load("sw_notice").await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].identity, "new");
    }

    #[tokio::test]
    async fn windows_are_partitioned_by_source() {
        let store = MemoryHistory::new(30);
        store.record("source_a", &[entry("1", 1)]).await.unwrap();

        assert_eq!(store.load("source_a").await.unwrap().len(), 1);
        assert!(store.load("source_b").await.unwrap().is_empty());
    }
}
