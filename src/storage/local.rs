// src/storage/local.rs

//! Local filesystem history backend.
//!
//! One JSON document per source at `{dir}/{source_id}.json`. Documents
//! are written atomically (temp file + rename), so a concurrent reader
//! observes either the previous window or the new one, never a partial
//! write.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::HistoryEntry;
use crate::storage::{HistoryDocument, HistoryStore, merge_entries};

/// Filesystem-backed history store.
#[derive(Clone)]
pub struct LocalHistory {
    dir: PathBuf,
    retention: usize,
}

impl LocalHistory {
    pub fn new(dir: impl Into<PathBuf>, retention: usize) -> Self {
        Self {
            dir: dir.into(),
            retention,
        }
    }

    fn path(&self, source_id: &str) -> PathBuf {
        self.dir.join(format!("{source_id}.json"))
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &PathBuf, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::persistence(e))?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| AppError::persistence(e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| AppError::persistence(e))?;
        file.flush().await.map_err(|e| AppError::persistence(e))?;
        drop(file);

        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| AppError::persistence(e))?;
        Ok(())
    }

    async fn write_json<T: Serialize>(&self, source_id: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(&self.path(source_id), &bytes).await
    }

    /// Read a JSON document, returning None if the file doesn't exist.
    async fn read_json<T: DeserializeOwned>(&self, source_id: &str) -> Result<Option<T>> {
        match tokio::fs::read(self.path(source_id)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::persistence(e)),
        }
    }
}

#[async_trait]
impl HistoryStore for LocalHistory {
    async fn load(&self, source_id: &str) -> Result<Vec<HistoryEntry>> {
        match self.read_json::<HistoryDocument>(source_id).await? {
            Some(document) => Ok(document.entries),
            None => Ok(Vec::new()),
        }
    }

    async fn record(&self, source_id: &str, entries: &[HistoryEntry]) -> Result<()> {
        let existing = self.load(source_id).await?;
        let merged = merge_entries(existing, entries, self.retention);
        self.write_json(source_id, &HistoryDocument::new(merged))
            .await
    }

    async fn replace_all(&self, source_id: &str, entries: &[HistoryEntry]) -> Result<()> {
        let merged = merge_entries(Vec::new(), entries, self.retention);
        self.write_json(source_id, &HistoryDocument::new(merged))
            .await
    }
}
