//! Notice record data structure.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::utils::url::extract_article_id;

/// One parsed announcement from a source.
///
/// Constructed by a source adapter during a poll cycle and immutable
/// afterwards. The `identity` field is derived from the link at construction
/// time so that the deduplication key can never diverge between the write
/// path and the compare path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoticeRecord {
    /// Identifier of the source this record came from
    pub source_id: String,

    /// Normalized notice title
    pub title: String,

    /// Absolute URL to the notice
    pub link: String,

    /// Publish timestamp in the reference timezone
    pub published: DateTime<FixedOffset>,

    /// Stable deduplication key derived from the link
    pub identity: String,
}

impl NoticeRecord {
    /// Build a record, deriving its identity from the link.
    ///
    /// The identity is the article identifier embedded in the link's query
    /// string when one exists, and the full link verbatim otherwise.
    pub fn new(
        source_id: impl Into<String>,
        title: impl Into<String>,
        link: impl Into<String>,
        published: DateTime<FixedOffset>,
    ) -> Self {
        let link = link.into();
        let identity = extract_article_id(&link).unwrap_or_else(|| link.clone());
        Self {
            source_id: source_id.into(),
            title: title.into(),
            link,
            published,
            identity,
        }
    }

    /// Format the record for display using a template.
    ///
    /// Supported placeholders:
    /// - `{source}`, `{title}`, `{date}`, `{link}`
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{source}", &self.source_id)
            .replace("{title}", &self.title)
            .replace("{date}", &self.published.format("%Y-%m-%d %H:%M").to_string())
            .replace("{link}", &self.link)
    }
}
