/// 缓存条目路径前缀
const CACHE_PREFIX: &str = "cache/";

/// 查询参数的规范化方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalizer {
    /// 去除首尾空白、合并内部空白并转为小写
    Name,
    /// 仅保留 ASCII 数字
    Digits,
}

impl Normalizer {
    pub fn normalize(self, raw: &str) -> String {
        match self {
            Normalizer::Name => raw
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase(),
            Normalizer::Digits => raw.chars().filter(char::is_ascii_digit).collect(),
        }
    }
}

/// 按端点划分的缓存键，所有调用者共享
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    endpoint: &'static str,
    argument: String,
}

impl CacheKey {
    pub fn new(endpoint: &'static str, normalized: impl Into<String>) -> Self {
        Self {
            endpoint,
            argument: normalized.into(),
        }
    }

    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }

    pub fn argument(&self) -> &str {
        &self.argument
    }

    /// 存储路径，参数经过百分号编码以免破坏路径结构
    pub fn path(&self) -> String {
        format!(
            "{}{}/{}",
            CACHE_PREFIX,
            self.endpoint,
            urlencoding::encode(&self.argument)
        )
    }
}
