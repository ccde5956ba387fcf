use std::collections::HashMap;

use serde::Deserialize;

/// 查询串：`key` 加上端点自己的参数
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct LookupParams(HashMap<String, String>);

impl LookupParams {
    pub fn key(&self) -> Option<&str> {
        self.argument("key")
    }

    pub fn argument(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}
