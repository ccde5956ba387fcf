use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::Config;

/// 通过 API Key 识别出的调用者
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit {
        payload: Value,
        cached_at: DateTime<Utc>,
    },
    Miss,
}

/// 扣费并查询成功的结果
#[derive(Debug, Clone, PartialEq)]
pub struct Charged {
    pub payload: Value,
    pub remaining: i64,
}

/// 一次完整请求的结果
#[derive(Debug, Clone, PartialEq)]
pub struct Served {
    pub payload: Value,
    pub remaining: i64,
    pub cached: bool,
}

#[derive(Debug, Clone)]
pub struct GateSettings {
    pub cache_ttl: Duration,
    pub upstream_timeout: Duration,
    /// 计数器为空时的初始额度
    pub initial_quota: i64,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(3600),
            upstream_timeout: Duration::from_secs(25),
            initial_quota: 0,
        }
    }
}

impl From<&Config> for GateSettings {
    fn from(config: &Config) -> Self {
        Self {
            cache_ttl: config.cache_ttl(),
            upstream_timeout: config.upstream_timeout(),
            initial_quota: config.initial_quota,
        }
    }
}
