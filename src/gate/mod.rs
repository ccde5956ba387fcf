// 额度与缓存网关
// 认证调用者、读取缓存、原子扣减额度并调用上游

mod clock;
mod types;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{Value, json};
use tokio::time::timeout;

use crate::cache::{CacheEntry, CacheKey, LookupCacheOperations};
use crate::endpoints::Endpoint;
use crate::error::{AuthError, GateError, QuotaError, StoreError, UpstreamError};
use crate::store::{DocumentStore, Transaction, USERS_PATH, counter_path};
use crate::upstream::{UpstreamProvider, UpstreamQuery};

pub use clock::{Clock, SystemClock};
pub use types::{CacheLookup, Caller, Charged, GateSettings, Served};

pub struct Gate {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    settings: GateSettings,
}

impl Gate {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>, settings: GateSettings) -> Self {
        Self {
            store,
            clock,
            settings,
        }
    }

    /// 按 API Key 查找调用者，遍历整个注册表
    pub async fn resolve(&self, api_key: Option<&str>) -> Result<Caller, GateError> {
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .ok_or(AuthError::MissingKey)?;

        let users = self.store.get(USERS_PATH).await?;
        let user_id = users
            .as_ref()
            .and_then(Value::as_object)
            .and_then(|users| {
                users
                    .iter()
                    .find(|(_, user)| user.get("api_key").and_then(Value::as_str) == Some(api_key))
            })
            .map(|(user_id, _)| user_id.clone())
            .ok_or(AuthError::InvalidKey)?;

        tracing::debug!("Resolved caller {}", user_id);
        Ok(Caller { user_id })
    }

    /// 读取缓存，过期条目视为缺失
    pub async fn lookup(&self, key: &CacheKey) -> Result<CacheLookup, GateError> {
        let Some(entry) = LookupCacheOperations::get_entry(self.store.as_ref(), key).await? else {
            return Ok(CacheLookup::Miss);
        };

        match entry.cached_at() {
            Some(cached_at) if entry.is_fresh(self.clock.now(), self.settings.cache_ttl) => {
                Ok(CacheLookup::Hit {
                    payload: entry.data,
                    cached_at,
                })
            }
            _ => Ok(CacheLookup::Miss),
        }
    }

    /// 当前存储的额度快照，不做扣减
    pub async fn remaining(&self, caller: &Caller, endpoint: &Endpoint) -> Result<i64, GateError> {
        let path = counter_path(&caller.user_id, endpoint.counter);
        match self.store.get(&path).await? {
            None | Some(Value::Null) => Ok(self.settings.initial_quota),
            Some(value) => value.as_i64().ok_or(StoreError::Corrupt.into()),
        }
    }

    /// 原子扣减一次额度，额度不足时不写入
    async fn charge(&self, caller: &Caller, endpoint: &Endpoint) -> Result<i64, GateError> {
        let path = counter_path(&caller.user_id, endpoint.counter);
        let initial_quota = self.settings.initial_quota;
        let corrupt = AtomicBool::new(false);

        let decrement = |current: Option<&Value>| {
            corrupt.store(false, Ordering::Relaxed);
            let value = match current {
                None | Some(Value::Null) => initial_quota,
                Some(value) => match value.as_i64() {
                    Some(value) => value,
                    None => {
                        corrupt.store(true, Ordering::Relaxed);
                        return None;
                    }
                },
            };
            (value > 0).then(|| json!(value - 1))
        };

        match self.store.atomic_update(&path, &decrement).await? {
            Transaction::Committed(value) => value.as_i64().ok_or(StoreError::Corrupt.into()),
            Transaction::Aborted if corrupt.load(Ordering::Relaxed) => {
                tracing::error!("Counter {} holds a non-integer value", path);
                Err(StoreError::Corrupt.into())
            }
            Transaction::Aborted => {
                tracing::warn!("Quota exhausted for {} on {}", caller.user_id, endpoint.name);
                Err(QuotaError::Exhausted.into())
            }
        }
    }

    /// 扣减额度后调用上游，成功时写入缓存
    ///
    /// 额度耗尽时不会调用上游；扣减之后的超时或上游错误不退还额度。
    pub async fn charge_and_fetch<F, Fut>(
        &self,
        caller: &Caller,
        endpoint: &Endpoint,
        key: &CacheKey,
        fetch: F,
    ) -> Result<Charged, GateError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, UpstreamError>>,
    {
        let remaining = self.charge(caller, endpoint).await?;
        tracing::debug!("Charged {} on {}, {} left", caller.user_id, endpoint.name, remaining);

        let payload = match timeout(self.settings.upstream_timeout, fetch()).await {
            Ok(Ok(payload)) => payload,
            Ok(Err(e)) => {
                tracing::warn!("Upstream failed for {}: {}", endpoint.name, e);
                return Err(e.into());
            }
            Err(_) => {
                tracing::warn!(
                    "Upstream timed out after {:?} for {}",
                    self.settings.upstream_timeout,
                    endpoint.name
                );
                return Err(UpstreamError::Timeout.into());
            }
        };

        // 额度已扣，缓存写入失败时仍返回结果
        let entry = CacheEntry::new(payload, self.clock.now());
        match LookupCacheOperations::put_entry(self.store.as_ref(), key, &entry).await {
            Ok(()) => tracing::debug!("Cached {}", key.path()),
            Err(e) => tracing::error!("Failed to cache {}: {}", key.path(), e),
        }

        Ok(Charged {
            payload: entry.data,
            remaining,
        })
    }

    /// 完整处理一次查询：命中缓存则免费返回，否则扣费查询
    pub async fn serve(
        &self,
        caller: &Caller,
        endpoint: &Endpoint,
        argument: &str,
        upstream: &dyn UpstreamProvider,
    ) -> Result<Served, GateError> {
        let key = CacheKey::new(endpoint.name, argument);

        if let CacheLookup::Hit { payload, cached_at } = self.lookup(&key).await? {
            tracing::debug!("Cache hit for {} (cached at {})", key.path(), cached_at);
            let remaining = self.remaining(caller, endpoint).await?;
            return Ok(Served {
                payload,
                remaining,
                cached: true,
            });
        }

        let query = UpstreamQuery {
            pairs: endpoint.upstream_pairs,
            argument: argument.to_string(),
        };
        let charged = self
            .charge_and_fetch(caller, endpoint, &key, || async {
                upstream
                    .fetch(&query)
                    .await
                    .and_then(|raw| endpoint.shape(raw))
            })
            .await?;

        Ok(Served {
            payload: charged.payload,
            remaining: charged.remaining,
            cached: false,
        })
    }
}
