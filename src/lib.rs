// src/lib.rs

//! noticast: notice board poller and notification dispatcher.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod scheduler;
pub mod sources;
pub mod storage;
pub mod utils;
