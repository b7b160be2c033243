// src/dispatch/webhook.rs

//! Generic JSON webhook sink.
//!
//! POSTs one flat JSON object per notice. This is the contract relay
//! services consume; anything richer belongs in a dedicated sink.

use async_trait::async_trait;
use serde::Serialize;

use crate::dispatch::NoticeSink;
use crate::error::{AppError, Result};
use crate::models::NoticeRecord;

/// Sink that POSTs notices to an arbitrary HTTP endpoint.
pub struct WebhookSink {
    name: String,
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    source_id: &'a str,
    title: &'a str,
    link: &'a str,
    published_at: String,
}

impl WebhookSink {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            client,
        }
    }
}

#[async_trait]
impl NoticeSink for WebhookSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&self, notice: &NoticeRecord) -> Result<()> {
        let payload = WebhookPayload {
            source_id: &notice.source_id,
            title: &notice.title,
            link: &notice.link,
            published_at: notice.published.to_rfc3339(),
        };

        self.client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::dispatch(&self.name, e))?;
        Ok(())
    }
}
