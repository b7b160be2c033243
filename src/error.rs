// src/error.rs

//! Unified error handling for the notice poller.

use std::fmt;

use thiserror::Error;

/// Result type alias for poller operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
///
/// Only `Config` and `Validation` errors raised at startup are fatal; every
/// other variant originates from a single source, sink, or store and is
/// logged and absorbed by the poll cycle.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Network fetch failed for a source (transport error, timeout, bad status)
    #[error("Fetch error for source {source_name}: {message}")]
    Fetch { source_name: String, message: String },

    /// Fetched page or feed body could not be parsed
    #[error("Parse error for source {source_name}: {message}")]
    Parse { source_name: String, message: String },

    /// History store unavailable
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Delivery to a notification sink failed
    #[error("Dispatch error for sink {sink}: {message}")]
    Dispatch { sink: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a fetch error for a source.
    pub fn fetch(source: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            source_name: source.into(),
            message: message.to_string(),
        }
    }

    /// Create a parse error for a source.
    pub fn parse(source: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse {
            source_name: source.into(),
            message: message.to_string(),
        }
    }

    /// Create a persistence error.
    pub fn persistence(message: impl fmt::Display) -> Self {
        Self::Persistence(message.to_string())
    }

    /// Create a dispatch error for a sink.
    pub fn dispatch(sink: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Dispatch {
            sink: sink.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
