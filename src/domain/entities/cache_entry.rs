//! Cached reference → URL mapping.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A resolved image URL memoized under its original reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Original, unnormalized reference string.
    pub key: String,
    /// Directly fetchable URL.
    #[serde(alias = "url")]
    pub resolved_url: String,
    /// Creation or refresh time in milliseconds since the Unix epoch.
    #[serde(alias = "ts")]
    pub timestamp: i64,
}

impl CacheEntry {
    /// Creates a new entry stamped at `now_ms`.
    #[must_use]
    pub fn new(key: impl Into<String>, resolved_url: impl Into<String>, now_ms: i64) -> Self {
        Self {
            key: key.into(),
            resolved_url: resolved_url.into(),
            timestamp: now_ms,
        }
    }

    /// Returns true while `now_ms - timestamp` is strictly below `ttl`.
    #[must_use]
    pub fn is_fresh(&self, now_ms: i64, ttl: Duration) -> bool {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        now_ms.saturating_sub(self.timestamp) < ttl_ms
    }

    /// Returns false for keys that must never be cached.
    ///
    /// `data:` URIs are already displayable and `blob:` URLs die with the
    /// page that created them.
    #[must_use]
    pub fn is_cacheable_key(key: &str) -> bool {
        let head = key.trim_start().get(..5).unwrap_or_default();
        !(head.eq_ignore_ascii_case("data:") || head.eq_ignore_ascii_case("blob:"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    #[test]
    fn test_freshness_boundary() {
        let entry = CacheEntry::new("k", "https://u", 1_000);
        assert!(entry.is_fresh(1_000, DAY));
        assert!(entry.is_fresh(1_000 + 86_399_999, DAY));
        assert!(!entry.is_fresh(1_000 + 86_400_000, DAY));
    }

    #[test]
    fn test_uncacheable_keys() {
        assert!(!CacheEntry::is_cacheable_key("data:image/png;base64,AAAA"));
        assert!(!CacheEntry::is_cacheable_key("DATA:image/png;base64,AAAA"));
        assert!(!CacheEntry::is_cacheable_key("blob:https://app/123"));
        assert!(CacheEntry::is_cacheable_key("events/42/cover.jpg"));
        assert!(CacheEntry::is_cacheable_key("db"));
    }

    #[test]
    fn test_deserializes_short_field_names() {
        let entry: CacheEntry =
            serde_json::from_str(r#"{"key":"a","url":"https://b","ts":5}"#).unwrap();
        assert_eq!(entry, CacheEntry::new("a", "https://b", 5));
    }
}
