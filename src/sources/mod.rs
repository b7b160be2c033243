// src/sources/mod.rs

//! Source adapters.
//!
//! Each adapter turns one fetched document (an HTML board page, an RSS
//! feed) into canonical notice records. Site quirks stay inside the
//! adapter; the poll cycle only sees the `SourceAdapter` contract.

mod board;
mod rss;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::models::{AdapterKind, Config, NoticeRecord, SourceDescriptor};

pub use board::BoardAdapter;
pub use rss::RssAdapter;

/// Strategy for polling one kind of source.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// The descriptor kind this adapter handles.
    fn kind(&self) -> AdapterKind;

    /// Fetch the source's endpoint once and parse it into notice records.
    ///
    /// Records come back in source-native order (typically newest first),
    /// bounded by the configured per-poll cap. Individually defective
    /// entries are skipped or repaired, never fatal to the whole page.
    async fn fetch_and_parse(&self, source: &SourceDescriptor) -> Result<Vec<NoticeRecord>>;
}

/// Adapter lookup keyed by descriptor kind.
pub struct AdapterRegistry {
    adapters: HashMap<AdapterKind, Arc<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    /// Build the standard registry with one adapter per supported kind.
    pub fn standard(config: Arc<Config>, client: Client) -> Self {
        let mut registry = Self {
            adapters: HashMap::new(),
        };
        registry.register(Arc::new(BoardAdapter::new(
            Arc::clone(&config),
            client.clone(),
        )));
        registry.register(Arc::new(RssAdapter::new(config, client)));
        registry
    }

    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        self.adapters.insert(adapter.kind(), adapter);
    }

    pub fn get(&self, kind: AdapterKind) -> Option<&Arc<dyn SourceAdapter>> {
        self.adapters.get(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::http::create_client;

    #[test]
    fn standard_registry_covers_all_kinds() {
        let config = Arc::new(Config::default());
        let client = create_client(&config.http).unwrap();
        let registry = AdapterRegistry::standard(config, client);

        for kind in [AdapterKind::Board, AdapterKind::Rss] {
            let adapter = registry.get(kind).expect("adapter registered");
            assert_eq!(adapter.kind(), kind);
        }
    }
}
