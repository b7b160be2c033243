// src/pipeline/diff.rs

//! Diff engine.
//!
//! Pure set subtraction: freshly scraped records minus the identities
//! already in history. Order is the adapter's emission order.

use std::collections::HashSet;

use crate::models::NoticeRecord;

/// Return the records whose identity is not in `known`, preserving the
/// adapter's emission order.
///
/// Identities repeated within one fetch (pinned rows often appear both
/// in the pinned block and in the normal listing) are emitted once,
/// keeping the first occurrence.
pub fn new_records(fresh: Vec<NoticeRecord>, known: &HashSet<String>) -> Vec<NoticeRecord> {
    let mut emitted: HashSet<String> = HashSet::new();
    fresh
        .into_iter()
        .filter(|record| !known.contains(&record.identity) && emitted.insert(record.identity.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};

    use super::*;

    fn record(identity: &str, title: &str) -> NoticeRecord {
        let kst = FixedOffset::east_opt(9 * 3600).unwrap();
        NoticeRecord::new(
            "sw_notice",
            title,
            format!("https://example.ac.kr/notice.do?articleNo={identity}"),
            kst.with_ymd_and_hms(2025, 4, 29, 9, 0, 0).unwrap(),
        )
    }

    fn known(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn known_identities_are_filtered_out() {
        // History {123}; fresh scrape [123, 124] -> only 124 is new.
        let fresh = vec![record("123", "Old"), record("124", "New")];
        let result = new_records(fresh, &known(&["123"]));

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].identity, "124");
    }

    #[test]
    fn rerun_with_updated_history_yields_nothing() {
        let fresh = vec![record("123", "Old"), record("124", "New")];
        let result = new_records(fresh, &known(&["123", "124"]));
        assert!(result.is_empty());
    }

    #[test]
    fn title_drift_does_not_resurrect_a_notice() {
        // Same article id, retitled on the source side.
        let fresh = vec![record("123", "Retitled announcement")];
        assert!(new_records(fresh, &known(&["123"])).is_empty());
    }

    #[test]
    fn emission_order_is_preserved() {
        let fresh = vec![
            record("5", "e"),
            record("3", "c"),
            record("9", "i"),
            record("1", "a"),
        ];
        let result = new_records(fresh, &known(&["3"]));

        let ids: Vec<&str> = result.iter().map(|r| r.identity.as_str()).collect();
        assert_eq!(ids, vec!["5", "9", "1"]);
    }

    #[test]
    fn duplicates_within_one_fetch_are_emitted_once() {
        let fresh = vec![
            record("7", "Pinned copy"),
            record("8", "Other"),
            record("7", "Listing copy"),
        ];
        let result = new_records(fresh, &HashSet::new());

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].identity, "7");
        assert_eq!(result[0].title, "Pinned copy");
    }

    #[test]
    fn empty_inputs_are_fine() {
        assert!(new_records(Vec::new(), &HashSet::new()).is_empty());
        assert!(new_records(Vec::new(), &known(&["1"])).is_empty());
    }
}
