use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{DocumentStore, Transaction, UpdateFn};
use crate::error::StoreError;

/// 进程内文档存储，更新函数在锁内执行
#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.docs.lock().await.get(path).cloned())
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        self.docs.lock().await.insert(path.to_string(), value);
        Ok(())
    }

    async fn atomic_update(
        &self,
        path: &str,
        update: UpdateFn<'_>,
    ) -> Result<Transaction, StoreError> {
        let mut docs = self.docs.lock().await;
        match update(docs.get(path)) {
            Some(next) => {
                docs.insert(path.to_string(), next.clone());
                Ok(Transaction::Committed(next))
            }
            None => Ok(Transaction::Aborted),
        }
    }
}
