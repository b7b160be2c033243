// src/models/mod.rs

//! Domain models for the notice poller.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod history;
mod notice;
mod source;

// Re-export all public types
pub use config::{
    CleaningConfig, Config, FormatConfig, HistoryConfig, HttpConfig, OperatingWindow, Replacement,
    SchedulerConfig, SinkConfig,
};
pub use history::HistoryEntry;
pub use notice::NoticeRecord;
pub use source::{AdapterKind, BoardSelectors, SourceDescriptor, SourceFile};
