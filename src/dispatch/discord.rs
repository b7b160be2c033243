// src/dispatch/discord.rs

//! Discord webhook sink.
//!
//! Posts each notice as an embed. Discord caps embed titles at 256
//! characters, so titles are truncated on grapheme boundaries. Transient
//! failures are retried with exponential backoff before the delivery is
//! reported as failed.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

use crate::dispatch::NoticeSink;
use crate::error::{AppError, Result};
use crate::models::NoticeRecord;

const EMBED_TITLE_LIMIT: usize = 256;
const MAX_ATTEMPTS: u8 = 3;

/// Sink that posts notices to a Discord webhook as embeds.
pub struct DiscordSink {
    name: String,
    endpoint: String,
    client: reqwest::Client,
    template: String,
}

#[derive(Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
    url: String,
}

#[derive(Serialize)]
struct DiscordWebhookPayload {
    content: Option<String>,
    embeds: Vec<DiscordEmbed>,
}

impl DiscordSink {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        client: reqwest::Client,
        template: String,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            client,
            template,
        }
    }

    fn build_payload(&self, notice: &NoticeRecord) -> DiscordWebhookPayload {
        DiscordWebhookPayload {
            content: None,
            embeds: vec![DiscordEmbed {
                title: truncate_graphemes(&notice.title, EMBED_TITLE_LIMIT),
                description: notice.format(&self.template),
                url: notice.link.clone(),
            }],
        }
    }
}

#[async_trait]
impl NoticeSink for DiscordSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&self, notice: &NoticeRecord) -> Result<()> {
        let payload = self.build_payload(notice);

        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let result = self
                .client
                .post(&self.endpoint)
                .json(&payload)
                .send()
                .await
                .and_then(|r| r.error_for_status());

            match result {
                Ok(_) => return Ok(()),
                Err(error) => {
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1))).await;
                        continue;
                    }
                    return Err(AppError::dispatch(&self.name, error));
                }
            }
        }
    }
}

/// Truncate to at most `limit` graphemes without splitting a cluster.
fn truncate_graphemes(text: &str, limit: usize) -> String {
    if text.graphemes(true).count() <= limit {
        return text.to_string();
    }
    let mut truncated: String = text.graphemes(true).take(limit.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};

    use super::*;

    #[test]
    fn short_titles_pass_through() {
        assert_eq!(truncate_graphemes("공지사항", 256), "공지사항");
    }

    #[test]
    fn long_titles_truncate_on_grapheme_boundaries() {
        let long = "공지".repeat(200);
        let truncated = truncate_graphemes(&long, 256);
        assert_eq!(truncated.graphemes(true).count(), 256);
        assert!(truncated.ends_with('…'));
    }

    #[test]
    fn payload_carries_embed_fields() {
        let kst = FixedOffset::east_opt(9 * 3600).unwrap();
        let notice = NoticeRecord::new(
            "sw_notice",
            "수강신청 안내",
            "https://example.ac.kr/notice.do?articleNo=1",
            kst.with_ymd_and_hms(2025, 4, 29, 9, 0, 0).unwrap(),
        );
        let sink = DiscordSink::new(
            "discord",
            "https://discord.com/api/webhooks/x/y",
            reqwest::Client::new(),
            "[{source}] {title}\n{date}\n{link}".to_string(),
        );

        let payload = sink.build_payload(&notice);
        assert_eq!(payload.embeds.len(), 1);
        assert_eq!(payload.embeds[0].title, "수강신청 안내");
        assert!(payload.embeds[0].description.contains("sw_notice"));
        assert_eq!(
            payload.embeds[0].url,
            "https://example.ac.kr/notice.do?articleNo=1"
        );
    }
}
