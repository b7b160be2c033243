// src/scheduler.rs

//! Fixed-cadence poll scheduler.
//!
//! Ticks are aligned to wall-clock multiples of the interval (a 300s
//! interval fires at :00, :05, :10, ...). A tick that lands while the
//! previous cycle is still in flight is skipped, not queued: the loop
//! awaits each cycle, so two cycles never overlap, and
//! `MissedTickBehavior::Skip` drops the ticks that piled up meanwhile.
//! A tick that fires later than the grace window after its nominal time
//! is skipped with a warning instead of running stale.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use crate::pipeline::{PollContext, run_cycle};
use crate::utils::date::now_in;

/// Seconds until the next wall-clock multiple of `interval_secs`.
fn secs_until_next_tick(now_unix: i64, interval_secs: u64) -> u64 {
    let interval = interval_secs as i64;
    (interval - now_unix.rem_euclid(interval)) as u64
}

/// How many seconds past its nominal time a tick fired.
fn tick_lateness(now_unix: i64, interval_secs: u64) -> u64 {
    now_unix.rem_euclid(interval_secs as i64) as u64
}

/// Drive poll cycles until the shutdown signal flips.
///
/// The signal is only observed between cycles; the caller bounds how
/// long an in-flight cycle may keep running after shutdown.
pub async fn run(ctx: Arc<PollContext>, mut shutdown: watch::Receiver<bool>) {
    let interval_secs = ctx.config.scheduler.interval_secs;
    let grace_secs = ctx.config.scheduler.grace_secs;
    let tz = ctx.config.reference_offset();

    let first_tick = secs_until_next_tick(Utc::now().timestamp(), interval_secs);
    log::info!(
        "Scheduler started: every {interval_secs}s, first cycle in {first_tick}s"
    );

    let mut ticker = tokio::time::interval_at(
        Instant::now() + Duration::from_secs(first_tick),
        Duration::from_secs(interval_secs),
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                log::info!("Shutdown signal received; scheduler stopping");
                break;
            }
            _ = ticker.tick() => {
                let now = now_in(&tz);

                let lateness = tick_lateness(now.timestamp(), interval_secs);
                if lateness > grace_secs {
                    log::warn!(
                        "Tick fired {lateness}s after its nominal time (grace {grace_secs}s); skipping this cycle"
                    );
                    continue;
                }

                if !ctx.config.window.allows(now) {
                    log::info!(
                        "Outside the operating window at {}; skipping this cycle",
                        now.format("%a %H:%M")
                    );
                    continue;
                }

                run_cycle(&ctx).await.log_summary();
            }
        }
    }
}
