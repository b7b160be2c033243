// src/utils/http.rs

//! HTTP client construction.

use std::time::Duration;

use crate::error::Result;
use crate::models::HttpConfig;

/// Create the shared HTTP client used by all adapters and sinks.
///
/// The per-request timeout doubles as the fetch-level timeout: a hung
/// source request fails with a `reqwest` timeout error instead of
/// stalling the poll cycle.
pub fn create_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}
