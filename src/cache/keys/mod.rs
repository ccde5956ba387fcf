/// 缓存键模块
/// 提供缓存键生成与参数规范化

pub mod lookup_keys;
