use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient, Script};
use serde_json::Value;

use super::{DocumentStore, Transaction, UpdateFn};
use crate::error::StoreError;

/// 文档键前缀
const DOC_PREFIX: &str = "doc:";

/// 乐观事务的最大尝试次数
const MAX_CAS_ATTEMPTS: usize = 25;

// 仅当当前值仍是读取时的值才写入
const COMPARE_AND_SET: &str = r#"
local current = redis.call('GET', KEYS[1])
if ARGV[1] == '1' then
    if current then return 0 end
elseif current ~= ARGV[2] then
    return 0
end
redis.call('SET', KEYS[1], ARGV[3])
return 1
"#;

/// Redis 文档存储，每个路径保存一段 JSON 文本
pub struct RedisStore {
    redis: Arc<RedisClient>,
    compare_and_set: Script,
}

fn doc_key(path: &str) -> String {
    format!("{}{}", DOC_PREFIX, path)
}

fn decode(json: &str) -> Result<Value, StoreError> {
    serde_json::from_str(json).map_err(|e| {
        tracing::error!("Failed to decode stored document: {}", e);
        StoreError::Corrupt
    })
}

// 脚本的期望参数：键不存在时为 ("1", "")，否则为 ("0", 读取到的原文)
fn expectation(raw: Option<&str>) -> (&'static str, &str) {
    match raw {
        Some(raw) => ("0", raw),
        None => ("1", ""),
    }
}

impl RedisStore {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self {
            redis,
            compare_and_set: Script::new(COMPARE_AND_SET),
        }
    }
}

#[async_trait]
impl DocumentStore for RedisStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let result: Option<String> = conn.get(doc_key(path)).await?;
        result.as_deref().map(decode).transpose()
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let _: () = conn.set(doc_key(path), value.to_string()).await?;
        Ok(())
    }

    async fn atomic_update(
        &self,
        path: &str,
        update: UpdateFn<'_>,
    ) -> Result<Transaction, StoreError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let key = doc_key(path);

        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let raw: Option<String> = conn.get(&key).await?;
            let current = raw.as_deref().map(decode).transpose()?;

            let Some(next) = update(current.as_ref()) else {
                return Ok(Transaction::Aborted);
            };

            let (expect_absent, expected) = expectation(raw.as_deref());
            let applied: i32 = self
                .compare_and_set
                .key(&key)
                .arg(expect_absent)
                .arg(expected)
                .arg(next.to_string())
                .invoke_async(&mut conn)
                .await?;

            if applied == 1 {
                return Ok(Transaction::Committed(next));
            }
            tracing::debug!("Concurrent write on {}, retrying (attempt {})", key, attempt);
        }

        tracing::warn!("Gave up updating {} after {} attempts", key, MAX_CAS_ATTEMPTS);
        Err(StoreError::Contended)
    }
}
