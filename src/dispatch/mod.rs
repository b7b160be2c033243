// src/dispatch/mod.rs

//! Notification sinks and fan-out dispatch.
//!
//! The dispatcher delivers each notice to every configured sink
//! independently; one sink failing is logged and does not stop delivery
//! to the others.

mod discord;
mod webhook;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{Config, NoticeRecord};

pub use discord::DiscordSink;
pub use webhook::WebhookSink;

/// One notification channel.
#[async_trait]
pub trait NoticeSink: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Deliver one notice.
    async fn deliver(&self, notice: &NoticeRecord) -> Result<()>;
}

/// Per-notice delivery tally across all sinks.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub delivered: usize,
    pub failed: usize,
}

/// Fans each notice out to every configured sink.
pub struct Dispatcher {
    sinks: Vec<Arc<dyn NoticeSink>>,
}

impl Dispatcher {
    pub fn new(sinks: Vec<Arc<dyn NoticeSink>>) -> Self {
        Self { sinks }
    }

    /// Build sinks from `[[sinks]]` config entries.
    ///
    /// An empty sink list is valid: the engine still records history, it
    /// just notifies nobody. Unknown kinds are a startup error.
    pub fn from_config(config: &Config, client: reqwest::Client) -> Result<Self> {
        let mut sinks: Vec<Arc<dyn NoticeSink>> = Vec::new();
        for sink in &config.sinks {
            match sink.kind.as_str() {
                "webhook" => sinks.push(Arc::new(WebhookSink::new(
                    sink.display_name(),
                    &sink.endpoint,
                    client.clone(),
                ))),
                "discord" => sinks.push(Arc::new(DiscordSink::new(
                    sink.display_name(),
                    &sink.endpoint,
                    client.clone(),
                    config.format.template.clone(),
                ))),
                other => {
                    return Err(AppError::config(format!("Unknown sink kind '{other}'")));
                }
            }
        }
        if sinks.is_empty() {
            log::warn!("No sinks configured; new notices will only be recorded in history");
        }
        Ok(Self::new(sinks))
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Deliver a notice to all sinks, isolating per-sink failures.
    pub async fn dispatch(&self, notice: &NoticeRecord) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        for sink in &self.sinks {
            match sink.deliver(notice).await {
                Ok(()) => outcome.delivered += 1,
                Err(error) => {
                    outcome.failed += 1;
                    log::warn!(
                        "Sink {} failed to deliver notice {} from source {}: {}",
                        sink.name(),
                        notice.identity,
                        notice.source_id,
                        error
                    );
                }
            }
        }
        outcome
    }
}
