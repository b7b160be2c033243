// src/sources/rss.rs

//! RSS feed adapter.
//!
//! Maps RSS 2.0 items onto the same record type the board adapter
//! produces, so the rest of the engine never knows which kind of source
//! a notice came from.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;

use crate::error::{AppError, Result};
use crate::models::{AdapterKind, Config, NoticeRecord, SourceDescriptor};
use crate::sources::SourceAdapter;
use crate::utils::date::now_in;

/// Adapter for RSS feed sources.
pub struct RssAdapter {
    config: Arc<Config>,
    client: reqwest::Client,
}

impl RssAdapter {
    pub fn new(config: Arc<Config>, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn parse_feed(&self, source: &SourceDescriptor, body: &[u8]) -> Result<Vec<NoticeRecord>> {
        let channel = rss::Channel::read_from(std::io::Cursor::new(body))
            .map_err(|e| AppError::parse(&source.id, e))?;

        let tz = self.config.reference_offset();
        let mut records = Vec::new();

        for item in channel
            .items()
            .iter()
            .take(self.config.http.max_records_per_poll)
        {
            // Guid stands in for a missing link; items with neither are useless.
            let link = match item.link().or_else(|| item.guid().map(|g| g.value())) {
                Some(link) if !link.trim().is_empty() => link.trim().to_string(),
                _ => {
                    log::debug!("Skipping RSS item without a link for source {}", source.id);
                    continue;
                }
            };

            let title = self
                .config
                .cleaning
                .clean_title(item.title().unwrap_or_default());
            if title.is_empty() {
                log::debug!("Skipping untitled RSS item for source {}", source.id);
                continue;
            }

            let published = match item
                .pub_date()
                .and_then(|value| DateTime::parse_from_rfc2822(value).ok())
            {
                Some(dt) => dt.with_timezone(&tz),
                None => {
                    log::warn!(
                        "RSS item without a parseable pubDate for source {} ({}); substituting current time",
                        source.id,
                        link
                    );
                    now_in(&tz)
                }
            };

            records.push(NoticeRecord::new(&source.id, title, link, published));
        }

        Ok(records)
    }
}

#[async_trait]
impl SourceAdapter for RssAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Rss
    }

    async fn fetch_and_parse(&self, source: &SourceDescriptor) -> Result<Vec<NoticeRecord>> {
        let response = self
            .client
            .get(&source.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::fetch(&source.id, e))?;
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::fetch(&source.id, e))?;

        self.parse_feed(source, &body)
    }
}
