/// 缓存操作
pub mod lookup;
