// 文档存储模块
// 用户、计数器与缓存条目都保存在外部存储中，进程内不持有共享状态

pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// 条件更新的结果
#[derive(Debug, Clone, PartialEq)]
pub enum Transaction {
    Committed(Value),
    Aborted,
}

/// 条件更新函数：返回 `None` 表示放弃写入
pub type UpdateFn<'a> = &'a (dyn Fn(Option<&Value>) -> Option<Value> + Send + Sync);

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// 原子地读取并有条件地写入，期间其他写入者的修改不会被覆盖
    async fn atomic_update(&self, path: &str, update: UpdateFn<'_>)
    -> Result<Transaction, StoreError>;
}

/// 用户注册表路径
pub const USERS_PATH: &str = "usuarios";

pub fn counter_path(user_id: &str, counter: &str) -> String {
    format!("{}/{}/contadores/{}", USERS_PATH, user_id, counter)
}
