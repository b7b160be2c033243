//! Poll pipeline: diff computation and the per-cycle orchestration.

pub mod cycle;
pub mod diff;

pub use cycle::{CycleOutcome, PollContext, run_cycle};
pub use diff::new_records;
