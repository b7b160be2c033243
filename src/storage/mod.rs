// src/storage/mod.rs

//! History persistence.
//!
//! One history document per source holds the bounded window of already
//! dispatched notices. The poll cycle goes through `HistoryService`,
//! which wraps the configured backend and degrades to in-memory
//! tracking when the backend fails.

pub mod local;
pub mod memory;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::HistoryEntry;

pub use local::LocalHistory;
pub use memory::MemoryHistory;

/// On-disk shape of one source's history document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryDocument {
    /// ISO 8601 timestamp of last update
    pub updated_at: DateTime<Utc>,
    /// Entry count
    pub count: usize,
    /// Entries, newest first
    pub entries: Vec<HistoryEntry>,
}

impl HistoryDocument {
    pub fn new(entries: Vec<HistoryEntry>) -> Self {
        Self {
            updated_at: Utc::now(),
            count: entries.len(),
            entries,
        }
    }
}

/// Backend for per-source history windows.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Load the retained window for a source, newest first.
    ///
    /// A source with no history yet loads as an empty window, not an error.
    async fn load(&self, source_id: &str) -> Result<Vec<HistoryEntry>>;

    /// Upsert entries into a source's window, keyed by identity.
    ///
    /// Re-recording an identity that already exists replaces that entry,
    /// so the call is safe to repeat. The window is re-sorted newest
    /// first and truncated to the retention count.
    async fn record(&self, source_id: &str, entries: &[HistoryEntry]) -> Result<()>;

    /// Atomically replace a source's entire window.
    async fn replace_all(&self, source_id: &str, entries: &[HistoryEntry]) -> Result<()>;
}

/// Merge `incoming` into `existing` by identity, newest first, truncated.
///
/// Shared by every backend so upsert semantics cannot drift between the
/// persistent store and the in-memory fallback.
pub(crate) fn merge_entries(
    existing: Vec<HistoryEntry>,
    incoming: &[HistoryEntry],
    retention: usize,
) -> Vec<HistoryEntry> {
    let mut merged = existing;
    for entry in incoming {
        match merged.iter_mut().find(|e| e.identity == entry.identity) {
            Some(slot) => *slot = entry.clone(),
            None => merged.push(entry.clone()),
        }
    }
    merged.sort_by(|a, b| b.published.cmp(&a.published));
    merged.truncate(retention);
    merged
}

/// History access used by the poll cycle.
///
/// Never surfaces a persistence error: the first backend failure flips
/// the service into degraded mode, and all later traffic goes to an
/// in-memory window for the remainder of the process lifetime. Every
/// successful backend read and write is mirrored into the fallback so
/// degradation starts from the freshest known state.
pub struct HistoryService {
    primary: Arc<dyn HistoryStore>,
    fallback: MemoryHistory,
    degraded: AtomicBool,
}

impl HistoryService {
    pub fn new(primary: Arc<dyn HistoryStore>, retention: usize) -> Self {
        Self {
            primary,
            fallback: MemoryHistory::new(retention),
            degraded: AtomicBool::new(false),
        }
    }

    /// Whether the service has fallen back to in-memory tracking.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    fn degrade(&self, op: &str, source_id: &str, error: &crate::error::AppError) {
        if !self.degraded.swap(true, Ordering::Relaxed) {
            log::warn!(
                "History store failed during {op} for source {source_id}: {error}. \
                 Falling back to in-memory tracking for the rest of this process."
            );
        }
    }

    pub async fn load(&self, source_id: &str) -> Vec<HistoryEntry> {
        if !self.is_degraded() {
            match self.primary.load(source_id).await {
                Ok(entries) => {
                    // Keep the fallback warm; MemoryHistory writes are infallible.
                    let _ = self.fallback.replace_all(source_id, &entries).await;
                    return entries;
                }
                Err(e) => self.degrade("load", source_id, &e),
            }
        }
        self.fallback.load(source_id).await.unwrap_or_default()
    }

    pub async fn record(&self, source_id: &str, entries: &[HistoryEntry]) {
        let _ = self.fallback.record(source_id, entries).await;
        if !self.is_degraded() {
            if let Err(e) = self.primary.record(source_id, entries).await {
                self.degrade("record", source_id, &e);
            }
        }
    }

    pub async fn replace_all(&self, source_id: &str, entries: &[HistoryEntry]) {
        let _ = self.fallback.replace_all(source_id, entries).await;
        if !self.is_degraded() {
            if let Err(e) = self.primary.replace_all(source_id, entries).await {
                self.degrade("replace_all", source_id, &e);
            }
        }
    }
}
