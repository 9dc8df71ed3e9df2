// Primitive format checks shared by the schemas

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn get_email_pattern() -> &'static Regex {
    EMAIL_PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
            .unwrap()
    })
}

/// Parse an ISO-8601 datetime in RFC 3339 form (`2025-01-18T12:00:00Z`,
/// `2025-01-18T12:00:00.123+09:00`). An explicit offset is required.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn is_valid_email(s: &str) -> bool {
    s.len() <= 254 && get_email_pattern().is_match(s)
}

/// Absolute URL with a scheme and, for hierarchical schemes, a host
pub fn is_valid_url(s: &str) -> bool {
    match url::Url::parse(s) {
        Ok(parsed) => parsed.cannot_be_a_base() || parsed.host().is_some(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_variants() {
        assert!(parse_datetime("2025-01-18T12:00:00Z").is_some());
        assert!(parse_datetime("2025-01-18T12:00:00.123+09:00").is_some());
        assert!(parse_datetime("2025-01-18T12:00:00").is_none());
        assert!(parse_datetime("2025-01-18").is_none());
        assert!(parse_datetime("yesterday").is_none());
        assert!(parse_datetime("2025-13-40T00:00:00Z").is_none());
    }

    #[test]
    fn test_offset_is_normalized_to_utc() {
        let dt = parse_datetime("2025-01-18T09:00:00+09:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-01-18T00:00:00+00:00");
    }

    #[test]
    fn test_email() {
        assert!(is_valid_email("founder@example.com"));
        assert!(is_valid_email("a.b+tag@sub.example.co.jp"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_url() {
        assert!(is_valid_url("https://example.com/article?id=1"));
        assert!(is_valid_url("http://localhost:3000"));
        assert!(is_valid_url("mailto:someone@example.com"));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("/relative/path"));
    }
}
