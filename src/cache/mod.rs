// 缓存模块
// 包含查询结果的缓存键、数据结构和操作逻辑

pub mod keys;
pub mod models;
pub mod operations;

// 重新导出常用类型，方便其他模块使用
pub use keys::lookup_keys::{CacheKey, Normalizer};
pub use models::lookup::CacheEntry;
pub use operations::lookup::LookupCacheOperations;
