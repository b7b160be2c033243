// src/utils/date.rs

//! Notice date parsing.
//!
//! Board sites publish dates in a handful of local formats, sometimes buried
//! in surrounding text, and recent notices often carry only a `HH:MM` clock
//! time. Everything is normalized to the configured reference timezone.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;

/// Formats tried in order when a source configures none of its own.
///
/// Two-digit-year formats come first: `%Y` happily consumes a two-digit
/// year as the literal year 25, while `%y` can never match a four-digit
/// year (the separator check fails after two digits).
pub const DEFAULT_FORMATS: [&str; 6] = [
    "%y.%m.%d",
    "%y-%m-%d",
    "%Y-%m-%d",
    "%Y.%m.%d",
    "%Y/%m/%d",
    "%H:%M",
];

/// Current time in the reference timezone.
pub fn now_in(tz: &FixedOffset) -> DateTime<FixedOffset> {
    Utc::now().with_timezone(tz)
}

/// Parse a cleaned date string against the given formats.
///
/// A time-only match is combined with today's date in the reference
/// timezone. When no format matches the whole string, a date token found
/// inside it (e.g. "2025.04.29 (18:45~20:15)") is retried. Returns `None`
/// when nothing matches; the caller substitutes the current time.
pub fn parse_notice_date(
    text: &str,
    formats: &[String],
    tz: &FixedOffset,
) -> Option<DateTime<FixedOffset>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let defaults: Vec<String>;
    let formats = if formats.is_empty() {
        defaults = DEFAULT_FORMATS.iter().map(|f| f.to_string()).collect();
        &defaults
    } else {
        formats
    };

    for fmt in formats {
        if let Some(dt) = parse_with_format(trimmed, fmt, tz) {
            return Some(dt);
        }
    }

    if let Some(token) = extract_date_token(trimmed) {
        for fmt in formats {
            if let Some(dt) = parse_with_format(token, fmt, tz) {
                return Some(dt);
            }
        }
    }

    None
}

fn parse_with_format(text: &str, fmt: &str, tz: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
        return tz.from_local_datetime(&dt).single();
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return tz.from_local_datetime(&midnight).single();
    }
    if let Ok(time) = NaiveTime::parse_from_str(text, fmt) {
        // Clock-only dates mean "posted today"
        let today = now_in(tz).date_naive();
        return tz.from_local_datetime(&today.and_time(time)).single();
    }
    None
}

/// Find a date-shaped token inside noisy surrounding text.
fn extract_date_token(text: &str) -> Option<&str> {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    let pattern = TOKEN.get_or_init(|| {
        Regex::new(r"\d{4}[./-]\d{1,2}[./-]\d{1,2}|\d{2}[./-]\d{1,2}[./-]\d{1,2}")
            .expect("date token pattern is valid")
    });
    pattern.find(text).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    fn parse(text: &str) -> Option<DateTime<FixedOffset>> {
        parse_notice_date(text, &[], &kst())
    }

    #[test]
    fn parses_iso_date() {
        let dt = parse("2025-04-29").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-04-29T00:00:00+09:00");
    }

    #[test]
    fn parses_dotted_date() {
        let dt = parse("2025.04.29").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-04-29T00:00:00+09:00");
    }

    #[test]
    fn parses_two_digit_year() {
        let dt = parse("25.04.29").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-04-29T00:00:00+09:00");
    }

    #[test]
    fn clock_time_means_today() {
        let dt = parse("18:45").unwrap();
        let today = now_in(&kst()).date_naive();
        assert_eq!(dt.date_naive(), today);
        assert_eq!(dt.format("%H:%M").to_string(), "18:45");
    }

    #[test]
    fn recovers_date_token_from_noise() {
        let dt = parse("2025.04.29 (18:45~20:15)").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-04-29T00:00:00+09:00");
    }

    #[test]
    fn custom_formats_take_precedence() {
        let formats = vec!["%d/%m/%Y".to_string()];
        let dt = parse_notice_date("29/04/2025", &formats, &kst()).unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-04-29T00:00:00+09:00");
    }

    #[test]
    fn unparseable_text_yields_none() {
        assert!(parse("coming soon").is_none());
        assert!(parse("").is_none());
        assert!(parse("   ").is_none());
    }

    #[test]
    fn normalizes_to_reference_offset() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let dt = parse_notice_date("2025-04-29", &[], &utc).unwrap();
        assert_eq!(dt.offset(), &utc);
    }
}
