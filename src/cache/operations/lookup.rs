use crate::cache::keys::lookup_keys::CacheKey;
use crate::cache::models::lookup::CacheEntry;
use crate::error::StoreError;
use crate::store::DocumentStore;

/// 查询结果缓存操作
pub struct LookupCacheOperations;

impl LookupCacheOperations {
    /// 读取缓存条目，不判断是否过期
    pub async fn get_entry(
        store: &dyn DocumentStore,
        key: &CacheKey,
    ) -> Result<Option<CacheEntry>, StoreError> {
        match store.get(&key.path()).await? {
            Some(doc) => match serde_json::from_value(doc) {
                Ok(entry) => Ok(Some(entry)),
                Err(e) => {
                    // 无法解析的旧条目视为缺失，下次成功查询时覆盖
                    tracing::warn!("Ignoring undecodable cache entry {}: {}", key.path(), e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// 写入缓存条目，覆盖已有条目
    pub async fn put_entry(
        store: &dyn DocumentStore,
        key: &CacheKey,
        entry: &CacheEntry,
    ) -> Result<(), StoreError> {
        let doc = serde_json::to_value(entry).map_err(|_| StoreError::Corrupt)?;
        store.set(&key.path(), doc).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Utc;
    use serde_json::json;

    #[tokio::test]
    async fn undecodable_entry_reads_as_missing() {
        let store = MemoryStore::new();
        let key = CacheKey::new("telefone", "11987654321");
        store.set(&key.path(), json!("garbage")).await.unwrap();

        let entry = LookupCacheOperations::get_entry(&store, &key).await.unwrap();
        assert!(entry.is_none());
    }

    #[tokio::test]
    async fn put_overwrites_previous_entry() {
        let store = MemoryStore::new();
        let key = CacheKey::new("nome", "maria");
        let first = CacheEntry::new(json!({"v": 1}), Utc::now());
        let second = CacheEntry::new(json!({"v": 2}), Utc::now());

        LookupCacheOperations::put_entry(&store, &key, &first).await.unwrap();
        LookupCacheOperations::put_entry(&store, &key, &second).await.unwrap();

        let stored = LookupCacheOperations::get_entry(&store, &key).await.unwrap();
        assert_eq!(stored, Some(second));
    }
}
