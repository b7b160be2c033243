//! Source descriptor structures and loading.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Which adapter implementation handles a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    /// Selector-driven HTML bulletin board
    Board,
    /// RSS feed
    Rss,
}

impl AdapterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterKind::Board => "board",
            AdapterKind::Rss => "rss",
        }
    }
}

/// Static configuration for a single polled source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Source unique identifier (also the history partition key)
    pub id: String,

    /// Human-readable source name
    pub name: String,

    /// Adapter kind handling this source
    pub kind: AdapterKind,

    /// Endpoint URL fetched once per poll cycle
    pub url: String,

    /// Whether this source participates in poll cycles
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// CSS selectors for board sources (required when kind = "board")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectors: Option<BoardSelectors>,

    /// Date formats tried in order; empty means the built-in defaults
    #[serde(default)]
    pub date_formats: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

/// CSS selectors for scraping a notice board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSelectors {
    /// Selector for each row/item in the notice list
    pub row_selector: String,

    /// Selector for the title element within a row
    pub title_selector: String,

    /// Selector for the date element within a row
    pub date_selector: String,

    /// HTML attribute name for extracting links (usually "href")
    #[serde(default = "default_attr_name")]
    pub attr_name: String,

    /// Optional link selector (if different from title_selector)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_selector: Option<String>,

    /// Selector matching rows marked as pinned/top-fixed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_selector: Option<String>,

    /// Selector for a category/author label prefixed onto the title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<String>,
}

fn default_attr_name() -> String {
    "href".to_string()
}

impl BoardSelectors {
    /// All selector strings, for syntax validation at startup.
    fn selector_strings(&self) -> Vec<&String> {
        let mut strings = vec![
            &self.row_selector,
            &self.title_selector,
            &self.date_selector,
        ];
        strings.extend(self.link_selector.as_ref());
        strings.extend(self.pinned_selector.as_ref());
        strings.extend(self.label_selector.as_ref());
        strings
    }
}

/// Root structure of the sources file (`[[sources]]` entries).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub sources: Vec<SourceDescriptor>,
}

impl SourceFile {
    /// Load source descriptors from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate that the descriptors form a runnable poll set.
    ///
    /// A failure here is one of the few fatal startup errors.
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(AppError::validation("No sources defined"));
        }
        if !self.sources.iter().any(|s| s.enabled) {
            return Err(AppError::validation("No sources enabled"));
        }

        let mut ids = HashSet::new();
        for source in &self.sources {
            if source.id.trim().is_empty() {
                return Err(AppError::validation("Source with empty id"));
            }
            if !source
                .id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            {
                return Err(AppError::validation(format!(
                    "Source id '{}' may only contain alphanumerics, '-' and '_'",
                    source.id
                )));
            }
            if !ids.insert(source.id.as_str()) {
                return Err(AppError::validation(format!(
                    "Duplicate source id '{}'",
                    source.id
                )));
            }
            url::Url::parse(&source.url).map_err(|e| {
                AppError::validation(format!("Source '{}' has an invalid URL: {e}", source.id))
            })?;

            match source.kind {
                AdapterKind::Board => {
                    let selectors = source.selectors.as_ref().ok_or_else(|| {
                        AppError::validation(format!(
                            "Board source '{}' is missing [sources.selectors]",
                            source.id
                        ))
                    })?;
                    for selector in selectors.selector_strings() {
                        scraper::Selector::parse(selector)
                            .map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
                    }
                }
                AdapterKind::Rss => {}
            }
        }
        Ok(())
    }

    /// Count of enabled sources.
    pub fn enabled_count(&self) -> usize {
        self.sources.iter().filter(|s| s.enabled).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_source(id: &str) -> SourceDescriptor {
        SourceDescriptor {
            id: id.to_string(),
            name: "Test Board".to_string(),
            kind: AdapterKind::Board,
            url: "https://example.ac.kr/bulletin/notice.do".to_string(),
            enabled: true,
            selectors: Some(BoardSelectors {
                row_selector: "table tbody tr".to_string(),
                title_selector: ".b-title-box a".to_string(),
                date_selector: ".b-date".to_string(),
                attr_name: "href".to_string(),
                link_selector: None,
                pinned_selector: None,
                label_selector: None,
            }),
            date_formats: Vec::new(),
        }
    }

    #[test]
    fn validate_accepts_board_with_selectors() {
        let file = SourceFile {
            sources: vec![board_source("sw_notice")],
        };
        assert!(file.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_source_list() {
        let file = SourceFile { sources: vec![] };
        assert!(file.validate().is_err());
    }

    #[test]
    fn validate_rejects_all_disabled() {
        let mut source = board_source("sw_notice");
        source.enabled = false;
        let file = SourceFile {
            sources: vec![source],
        };
        assert!(file.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let file = SourceFile {
            sources: vec![board_source("sw_notice"), board_source("sw_notice")],
        };
        assert!(file.validate().is_err());
    }

    #[test]
    fn validate_rejects_board_without_selectors() {
        let mut source = board_source("sw_notice");
        source.selectors = None;
        let file = SourceFile {
            sources: vec![source],
        };
        assert!(file.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_selector_syntax() {
        let mut source = board_source("sw_notice");
        source.selectors.as_mut().unwrap().row_selector = "[[invalid".to_string();
        let file = SourceFile {
            sources: vec![source],
        };
        assert!(file.validate().is_err());
    }

    #[test]
    fn validate_rejects_id_with_path_characters() {
        let file = SourceFile {
            sources: vec![board_source("../escape")],
        };
        assert!(file.validate().is_err());
    }

    #[test]
    fn rss_source_needs_no_selectors() {
        let file = SourceFile {
            sources: vec![SourceDescriptor {
                id: "cs_rss".to_string(),
                name: "CS RSS".to_string(),
                kind: AdapterKind::Rss,
                url: "https://example.ac.kr/rss.xml".to_string(),
                enabled: true,
                selectors: None,
                date_formats: Vec::new(),
            }],
        };
        assert!(file.validate().is_ok());
    }

    #[test]
    fn descriptor_toml_round_trip() {
        let toml_str = r#"
            [[sources]]
            id = "sw_notice"
            name = "SW Notice"
            kind = "board"
            url = "https://example.ac.kr/bulletin/notice.do"

            [sources.selectors]
            row_selector = "table tbody tr"
            title_selector = ".b-title-box a"
            date_selector = ".b-date"

            [[sources]]
            id = "cs_rss"
            name = "CS RSS"
            kind = "rss"
            url = "https://example.ac.kr/rss.xml"
            enabled = false
        "#;
        let file: SourceFile = toml::from_str(toml_str).unwrap();
        assert_eq!(file.sources.len(), 2);
        assert_eq!(file.sources[0].kind, AdapterKind::Board);
        assert!(file.sources[0].enabled);
        assert_eq!(file.sources[0].selectors.as_ref().unwrap().attr_name, "href");
        assert_eq!(file.sources[1].kind, AdapterKind::Rss);
        assert!(!file.sources[1].enabled);
        assert_eq!(file.enabled_count(), 1);
    }
}
