// src/pipeline/cycle.rs

//! One poll cycle: fetch, diff, record, dispatch, per enabled source.
//!
//! Sources run concurrently under a bounded worker limit. A failing
//! source is logged and counted; it never takes the cycle down with it.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::dispatch::Dispatcher;
use crate::error::{AppError, Result};
use crate::models::{Config, HistoryEntry, SourceDescriptor};
use crate::pipeline::diff;
use crate::sources::AdapterRegistry;
use crate::storage::HistoryService;

/// Everything a poll cycle needs, assembled once at startup.
pub struct PollContext {
    pub config: Arc<Config>,
    pub sources: Vec<SourceDescriptor>,
    pub registry: AdapterRegistry,
    pub history: HistoryService,
    pub dispatcher: Dispatcher,
}

/// Summary of one poll cycle.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    pub sources_total: usize,
    pub sources_failed: usize,
    pub fetched: usize,
    pub new_notices: usize,
    pub dispatched: usize,
    pub dispatch_failures: usize,
}

impl CycleOutcome {
    pub fn log_summary(&self) {
        log::info!(
            "Cycle done: {}/{} sources ok, {} fetched, {} new, {} deliveries ({} failed)",
            self.sources_total - self.sources_failed,
            self.sources_total,
            self.fetched,
            self.new_notices,
            self.dispatched,
            self.dispatch_failures,
        );
    }
}

#[derive(Debug, Default)]
struct SourceOutcome {
    fetched: usize,
    new_notices: usize,
    dispatched: usize,
    dispatch_failures: usize,
}

/// Run one poll cycle over all enabled sources.
pub async fn run_cycle(ctx: &PollContext) -> CycleOutcome {
    let enabled: Vec<&SourceDescriptor> = ctx.sources.iter().filter(|s| s.enabled).collect();
    let concurrency = ctx.config.http.max_concurrent.max(1);
    let delay = Duration::from_millis(ctx.config.http.request_delay_ms);

    let mut outcome = CycleOutcome {
        sources_total: enabled.len(),
        ..CycleOutcome::default()
    };

    let enabled = &enabled;
    let mut jobs = stream::iter(0..enabled.len())
        .map(|idx| async move {
            let source = enabled[idx];
            let result = poll_source(ctx, source).await;
            (source, result)
        })
        .buffer_unordered(concurrency);

    while let Some((source, result)) = jobs.next().await {
        match result {
            Ok(per_source) => {
                outcome.fetched += per_source.fetched;
                outcome.new_notices += per_source.new_notices;
                outcome.dispatched += per_source.dispatched;
                outcome.dispatch_failures += per_source.dispatch_failures;
            }
            Err(error) => {
                outcome.sources_failed += 1;
                log::warn!("Source {} failed this cycle: {}", source.id, error);
            }
        }

        if delay.as_millis() > 0 {
            tokio::time::sleep(delay).await;
        }
    }

    outcome
}

/// Fetch one source, diff against its history, record and dispatch the
/// new notices.
///
/// History is recorded before dispatch: a notice never re-notifies once
/// the diff decision is made, even if some sink deliveries then fail.
async fn poll_source(ctx: &PollContext, source: &SourceDescriptor) -> Result<SourceOutcome> {
    let adapter = ctx.registry.get(source.kind).ok_or_else(|| {
        AppError::config(format!(
            "No adapter registered for kind '{}'",
            source.kind.as_str()
        ))
    })?;

    let fresh = adapter.fetch_and_parse(source).await?;
    let mut per_source = SourceOutcome {
        fetched: fresh.len(),
        ..SourceOutcome::default()
    };

    let known: HashSet<String> = ctx
        .history
        .load(&source.id)
        .await
        .into_iter()
        .map(|entry| entry.identity)
        .collect();

    let new = diff::new_records(fresh, &known);
    per_source.new_notices = new.len();
    if new.is_empty() {
        log::debug!("No new notices for source {}", source.id);
        return Ok(per_source);
    }

    let entries: Vec<HistoryEntry> = new.iter().map(HistoryEntry::from).collect();
    ctx.history.record(&source.id, &entries).await;

    log::info!("{} new notice(s) for source {}", new.len(), source.id);
    for notice in &new {
        let delivery = ctx.dispatcher.dispatch(notice).await;
        per_source.dispatched += delivery.delivered;
        per_source.dispatch_failures += delivery.failed;
    }

    Ok(per_source)
}
