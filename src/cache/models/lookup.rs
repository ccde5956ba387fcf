use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 上游结果缓存条目
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CacheEntry {
    pub data: Value,
    pub timestamp: i64, // Unix timestamp (ms)
}

impl CacheEntry {
    pub fn new(data: Value, now: DateTime<Utc>) -> Self {
        Self {
            data,
            timestamp: now.timestamp_millis(),
        }
    }

    pub fn cached_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// 条目仅在 `now - timestamp < ttl` 时有效
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = now.timestamp_millis() - self.timestamp;
        age < i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn freshness_boundary_is_exclusive() {
        let written = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let entry = CacheEntry::new(json!({"resultado": []}), written);
        let ttl = Duration::from_secs(3600);

        assert!(entry.is_fresh(written + chrono::Duration::milliseconds(3_599_999), ttl));
        assert!(!entry.is_fresh(written + chrono::Duration::milliseconds(3_600_000), ttl));
        assert_eq!(entry.cached_at(), Some(written));
    }

    #[test]
    fn huge_ttl_keeps_entries_fresh() {
        let written = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let entry = CacheEntry::new(json!({}), written);
        let later = written + chrono::Duration::days(365);

        assert!(entry.is_fresh(later, Duration::from_secs(u64::MAX)));
    }
}
