// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Query keys that carry a board's article identifier.
const ARTICLE_KEYS: [&str; 10] = [
    "articleno",
    "article_no",
    "articleid",
    "article_id",
    "notice_id",
    "noticeid",
    "board_seq",
    "seq",
    "no",
    "id",
];

/// Extract a stable article identifier from a notice link.
///
/// Scans the query string for a known article-number key and returns its
/// value. Returns `None` when the link carries no such key; callers then use
/// the full link as the identity. This rule runs once, at record
/// construction, so the persisted history and the freshly scraped records
/// always agree on what an identity looks like.
pub fn extract_article_id(link: &str) -> Option<String> {
    let parsed = Url::parse(link).ok()?;

    for (key, value) in parsed.query_pairs() {
        if value.is_empty() {
            continue;
        }
        let key_lower = key.to_lowercase();
        if ARTICLE_KEYS.contains(&key_lower.as_str()) {
            return Some(value.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_path() {
        let base = Url::parse("https://example.com/path/").unwrap();
        assert_eq!(
            resolve_url(&base, "page.html"),
            "https://example.com/path/page.html"
        );
    }

    #[test]
    fn test_resolve_absolute_path() {
        let base = Url::parse("https://example.com/path/index.do").unwrap();
        assert_eq!(
            resolve_url(&base, "/root.html"),
            "https://example.com/root.html"
        );
    }

    #[test]
    fn test_resolve_query_only_href() {
        let base = Url::parse("https://example.ac.kr/bulletin/notice.do").unwrap();
        assert_eq!(
            resolve_url(&base, "?mode=view&articleNo=1234"),
            "https://example.ac.kr/bulletin/notice.do?mode=view&articleNo=1234"
        );
    }

    #[test]
    fn test_resolve_already_absolute() {
        let base = Url::parse("https://example.com/path/").unwrap();
        assert_eq!(
            resolve_url(&base, "https://other.com/x"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_extract_article_no() {
        let url = "https://example.ac.kr/notice.do?mode=view&articleNo=1234";
        assert_eq!(extract_article_id(url), Some("1234".to_string()));
    }

    #[test]
    fn test_extract_is_case_insensitive() {
        let url = "https://example.ac.kr/notice.do?ARTICLENO=77";
        assert_eq!(extract_article_id(url), Some("77".to_string()));
    }

    #[test]
    fn test_extract_seq_key() {
        let url = "https://example.ac.kr/board/view.do?board_seq=888";
        assert_eq!(extract_article_id(url), Some("888".to_string()));
    }

    #[test]
    fn test_extract_skips_empty_values() {
        let url = "https://example.ac.kr/notice.do?articleNo=&seq=42";
        assert_eq!(extract_article_id(url), Some("42".to_string()));
    }

    #[test]
    fn test_extract_none_without_known_key() {
        assert_eq!(
            extract_article_id("https://example.ac.kr/notice/view/first"),
            None
        );
        assert_eq!(
            extract_article_id("https://example.ac.kr/notice.do?mode=list&page=2"),
            None
        );
    }

    #[test]
    fn test_extract_none_for_unparseable_link() {
        assert_eq!(extract_article_id("not a url"), None);
    }
}
