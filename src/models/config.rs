//! Application configuration structures.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client and polling behavior settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Poll cadence settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Allowed polling days and hours
    #[serde(default)]
    pub window: OperatingWindow,

    /// History persistence settings
    #[serde(default)]
    pub history: HistoryConfig,

    /// Text preprocessing settings
    #[serde(default)]
    pub cleaning: CleaningConfig,

    /// Outgoing message formatting
    #[serde(default)]
    pub format: FormatConfig,

    /// Reference timezone as a fixed UTC offset in hours (default +9, KST)
    #[serde(default = "defaults::timezone_offset_hours")]
    pub timezone_offset_hours: i32,

    /// Notification sink definitions
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.http.max_concurrent == 0 {
            return Err(AppError::validation("http.max_concurrent must be > 0"));
        }
        if self.http.max_records_per_poll == 0 {
            return Err(AppError::validation("http.max_records_per_poll must be > 0"));
        }
        if self.scheduler.interval_secs == 0 {
            return Err(AppError::validation("scheduler.interval_secs must be > 0"));
        }
        if self.history.retention == 0 {
            return Err(AppError::validation("history.retention must be > 0"));
        }
        if !(-12..=14).contains(&self.timezone_offset_hours) {
            return Err(AppError::validation(
                "timezone_offset_hours must be between -12 and +14",
            ));
        }
        self.window.validate()?;
        for sink in &self.sinks {
            if !matches!(sink.kind.as_str(), "webhook" | "discord") {
                return Err(AppError::validation(format!(
                    "Unknown sink kind '{}' (expected \"webhook\" or \"discord\")",
                    sink.kind
                )));
            }
            if sink.endpoint.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "Sink '{}' has an empty endpoint",
                    sink.display_name()
                )));
            }
        }
        Ok(())
    }

    /// The reference timezone all timestamps are normalized to.
    pub fn reference_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.timezone_offset_hours * 3600)
            .expect("timezone_offset_hours validated at startup")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            scheduler: SchedulerConfig::default(),
            window: OperatingWindow::default(),
            history: HistoryConfig::default(),
            cleaning: CleaningConfig::default(),
            format: FormatConfig::default(),
            timezone_offset_hours: defaults::timezone_offset_hours(),
            sinks: Vec::new(),
        }
    }
}

/// HTTP client and polling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between per-source jobs in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum concurrently polled sources
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Maximum records taken from one page or feed per poll
    #[serde(default = "defaults::max_records_per_poll")]
    pub max_records_per_poll: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
            max_records_per_poll: defaults::max_records_per_poll(),
        }
    }
}

/// Poll cadence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between poll cycles; the first tick is aligned to the next
    /// wall-clock multiple of this interval
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// How late a tick may fire and still run its cycle
    #[serde(default = "defaults::grace")]
    pub grace_secs: u64,

    /// How long an in-flight cycle may run after a shutdown signal
    #[serde(default = "defaults::shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
            grace_secs: defaults::grace(),
            shutdown_grace_secs: defaults::shutdown_grace(),
        }
    }
}

/// Allowed polling days and hours, evaluated in the reference timezone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatingWindow {
    /// Whether the window is enforced at all
    #[serde(default = "defaults::enforced")]
    pub enforced: bool,

    /// Allowed ISO weekdays (1 = Monday .. 7 = Sunday)
    #[serde(default = "defaults::weekdays")]
    pub weekdays: Vec<u32>,

    /// First allowed hour (inclusive)
    #[serde(default = "defaults::start_hour")]
    pub start_hour: u32,

    /// Last allowed hour (inclusive)
    #[serde(default = "defaults::end_hour")]
    pub end_hour: u32,
}

impl OperatingWindow {
    /// Whether polling is allowed at the given local time.
    pub fn allows(&self, at: DateTime<FixedOffset>) -> bool {
        if !self.enforced {
            return true;
        }
        if !self.weekdays.contains(&at.weekday().number_from_monday()) {
            return false;
        }
        let hour = at.hour();
        hour >= self.start_hour && hour <= self.end_hour
    }

    fn validate(&self) -> Result<()> {
        if self.weekdays.is_empty() {
            return Err(AppError::validation("window.weekdays is empty"));
        }
        if self.weekdays.iter().any(|d| !(1..=7).contains(d)) {
            return Err(AppError::validation(
                "window.weekdays must use ISO numbering (1 = Monday .. 7 = Sunday)",
            ));
        }
        if self.end_hour > 23 || self.start_hour > self.end_hour {
            return Err(AppError::validation(
                "window hours must satisfy 0 <= start_hour <= end_hour <= 23",
            ));
        }
        Ok(())
    }
}

impl Default for OperatingWindow {
    fn default() -> Self {
        Self {
            enforced: defaults::enforced(),
            weekdays: defaults::weekdays(),
            start_hour: defaults::start_hour(),
            end_hour: defaults::end_hour(),
        }
    }
}

/// History persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Directory holding one history document per source
    #[serde(default = "defaults::history_dir")]
    pub dir: String,

    /// Most-recent entries retained per source
    #[serde(default = "defaults::retention")]
    pub retention: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dir: defaults::history_dir(),
            retention: defaults::retention(),
        }
    }
}

/// Text cleaning/preprocessing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Patterns to remove from titles
    #[serde(default = "defaults::title_remove_patterns")]
    pub title_remove_patterns: Vec<String>,

    /// Patterns to remove from dates
    #[serde(default = "defaults::date_remove_patterns")]
    pub date_remove_patterns: Vec<String>,

    /// Text replacements to apply to dates
    #[serde(default)]
    pub date_replacements: Vec<Replacement>,

    /// Marker prefixed onto pinned/top-fixed notices
    #[serde(default = "defaults::pinned_marker")]
    pub pinned_marker: String,
}

impl CleaningConfig {
    /// Clean text by removing patterns and applying replacements.
    fn clean(&self, text: &str, patterns: &[String], replacements: &[Replacement]) -> String {
        let mut result = Self::normalize_whitespace(text);

        for pattern in patterns {
            result = result.replace(pattern, "");
        }

        for r in replacements {
            result = result.replace(&r.from, &r.to);
        }

        result.trim().to_string()
    }

    /// Clean a title string.
    pub fn clean_title(&self, text: &str) -> String {
        self.clean(text, &self.title_remove_patterns, &[])
    }

    /// Clean a date string.
    pub fn clean_date(&self, text: &str) -> String {
        self.clean(text, &self.date_remove_patterns, &self.date_replacements)
    }

    fn normalize_whitespace(s: &str) -> String {
        s.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            title_remove_patterns: defaults::title_remove_patterns(),
            date_remove_patterns: defaults::date_remove_patterns(),
            date_replacements: Vec::new(),
            pinned_marker: defaults::pinned_marker(),
        }
    }
}

/// A text replacement rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

/// Outgoing message formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Notice message template (`{source}`, `{title}`, `{date}`, `{link}`)
    #[serde(default = "defaults::template")]
    pub template: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            template: defaults::template(),
        }
    }
}

/// One notification sink definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink kind: "webhook" or "discord"
    pub kind: String,

    /// Display name used in logs (defaults to the kind)
    #[serde(default)]
    pub name: String,

    /// Endpoint URL deliveries are POSTed to
    pub endpoint: String,
}

impl SinkConfig {
    /// Name for log output, falling back to the kind.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.kind
        } else {
            &self.name
        }
    }
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; noticast/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        100
    }
    pub fn max_concurrent() -> usize {
        4
    }
    pub fn max_records_per_poll() -> usize {
        32
    }

    // Scheduler defaults
    pub fn interval() -> u64 {
        300
    }
    pub fn grace() -> u64 {
        50
    }
    pub fn shutdown_grace() -> u64 {
        30
    }

    // Operating window defaults (Monday through Saturday, 08:00-20:59)
    pub fn enforced() -> bool {
        true
    }
    pub fn weekdays() -> Vec<u32> {
        vec![1, 2, 3, 4, 5, 6]
    }
    pub fn start_hour() -> u32 {
        8
    }
    pub fn end_hour() -> u32 {
        20
    }

    // History defaults
    pub fn history_dir() -> String {
        "data/history".into()
    }
    pub fn retention() -> usize {
        30
    }

    // Cleaning defaults
    pub fn title_remove_patterns() -> Vec<String> {
        vec!["자세히 보기".into()]
    }
    pub fn date_remove_patterns() -> Vec<String> {
        vec!["작성일".into(), "등록일".into(), "일시 및 기간:".into()]
    }
    pub fn pinned_marker() -> String {
        "[공지]".into()
    }

    // Format defaults
    pub fn template() -> String {
        "[{source}] {title}\n{date}\n{link}".into()
    }

    // Timezone default (KST)
    pub fn timezone_offset_hours() -> i32 {
        9
    }
}
