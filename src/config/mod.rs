use std::env;
use std::fmt;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    pub redis_url: String,
    pub upstream_base_url: String,
    pub upstream_api_key: String,
    pub upstream_key_param: String,
    pub upstream_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub initial_quota: i64,
    pub allowed_origin: String,
    pub api_base_uri: String,
    pub server_host: String,
    pub server_port: u16,
    pub debug: bool,
}

/// 缺失的必需环境变量
#[derive(Debug, thiserror::Error)]
#[error("missing environment variable {0}")]
pub struct MissingVar(pub &'static str);

impl Config {
    pub fn from_env() -> Result<Self, MissingVar> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 从任意键值来源构建配置，数值解析失败时回退到默认值
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MissingVar>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(MissingVar(name))
        };
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Config {
            redis_url: required("REDIS_URL")?,
            upstream_base_url: required("UPSTREAM_BASE_URL")?,
            upstream_api_key: required("UPSTREAM_API_KEY")?,
            upstream_key_param: optional("UPSTREAM_KEY_PARAM").unwrap_or_else(|| "apikey".into()),
            upstream_timeout_secs: optional("UPSTREAM_TIMEOUT")
                .and_then(|v| v.trim_end_matches('s').parse().ok())
                .unwrap_or(25),
            cache_ttl_secs: optional("CACHE_TTL")
                .and_then(|v| v.trim_end_matches('s').parse().ok())
                .unwrap_or(3600),
            initial_quota: optional("INITIAL_QUOTA")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            allowed_origin: required("ALLOWED_ORIGIN")?,
            api_base_uri: optional("API_BASE_URI").unwrap_or_else(|| "/api".into()),
            server_host: optional("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port: optional("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            debug: optional("DEBUG")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("redis_url", &self.redis_url)
            .field("upstream_base_url", &self.upstream_base_url)
            .field("upstream_api_key", &"***")
            .field("upstream_key_param", &self.upstream_key_param)
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("initial_quota", &self.initial_quota)
            .field("allowed_origin", &self.allowed_origin)
            .field("api_base_uri", &self.api_base_uri)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("debug", &self.debug)
            .finish()
    }
}
