// src/utils/mod.rs

//! Utility functions and helpers.

pub mod date;
pub mod http;
pub mod url;

pub use url::resolve_url;
