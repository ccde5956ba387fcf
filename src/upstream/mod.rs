// 上游查询服务
// 网关只依赖 `UpstreamProvider`，超时由调用方控制

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::UpstreamError;

/// 一次上游查询：端点固定参数加上查询值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamQuery {
    pub pairs: &'static [(&'static str, &'static str)],
    pub argument: String,
}

#[async_trait]
pub trait UpstreamProvider: Send + Sync {
    async fn fetch(&self, query: &UpstreamQuery) -> Result<Value, UpstreamError>;
}

/// 基于 HTTP GET 的上游实现
pub struct HttpProvider {
    client: Client,
    base_url: Url,
    api_key: String,
    key_param: String,
}

impl HttpProvider {
    pub fn new(base_url: Url, api_key: String, key_param: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            key_param,
        }
    }

    fn build_url(&self, query: &UpstreamQuery, api_key: &str) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query.pairs {
                pairs.append_pair(name, value);
            }
            pairs
                .append_pair("query", &query.argument)
                .append_pair(&self.key_param, api_key);
        }
        url
    }
}

#[async_trait]
impl UpstreamProvider for HttpProvider {
    async fn fetch(&self, query: &UpstreamQuery) -> Result<Value, UpstreamError> {
        tracing::debug!("Calling upstream {}", self.build_url(query, "***"));

        let response = self
            .client
            .get(self.build_url(query, &self.api_key))
            .send()
            .await
            .map_err(|e| {
                // 去掉 URL，避免密钥进入日志
                let e = e.without_url();
                tracing::warn!("Upstream request failed: {}", e);
                if e.is_timeout() {
                    UpstreamError::Timeout
                } else {
                    UpstreamError::BadResponse(502)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Upstream returned status {}", status);
            return Err(UpstreamError::BadResponse(status.as_u16()));
        }

        response.json::<Value>().await.map_err(|e| {
            tracing::warn!("Upstream body is not JSON: {}", e.without_url());
            UpstreamError::Malformed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};
    use serde_json::json;
    use std::collections::HashMap;

    fn provider(base: &str) -> HttpProvider {
        HttpProvider::new(
            Url::parse(base).unwrap(),
            "s3gr&do".to_string(),
            "apikey".to_string(),
        )
    }

    fn telefone_query() -> UpstreamQuery {
        UpstreamQuery {
            pairs: &[("modulo", "tel")],
            argument: "11 98765-4321".to_string(),
        }
    }

    #[test]
    fn url_carries_fixed_pairs_argument_and_key() {
        let url = provider("https://provider.example/consulta").build_url(&telefone_query(), "k");
        assert_eq!(
            url.as_str(),
            "https://provider.example/consulta?modulo=tel&query=11+98765-4321&apikey=k"
        );
    }

    #[test]
    fn key_is_percent_encoded() {
        let p = provider("https://provider.example/consulta");
        let url = p.build_url(&telefone_query(), &p.api_key);
        assert!(url.as_str().ends_with("apikey=s3gr%26do"));
    }

    async fn spawn_upstream(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/consulta", addr)
    }

    #[tokio::test]
    async fn fetch_returns_json_payload() {
        let app = Router::new().route(
            "/consulta",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                Json(json!({ "resultado": { "query": q["query"], "key": q["apikey"] } }))
            }),
        );
        let base = spawn_upstream(app).await;

        let payload = provider(&base).fetch(&telefone_query()).await.unwrap();
        assert_eq!(payload["resultado"]["query"], "11 98765-4321");
        assert_eq!(payload["resultado"]["key"], "s3gr&do");
    }

    #[tokio::test]
    async fn non_success_status_is_bad_response() {
        let app = Router::new().route(
            "/consulta",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let base = spawn_upstream(app).await;

        let err = provider(&base).fetch(&telefone_query()).await.unwrap_err();
        assert_eq!(err, UpstreamError::BadResponse(503));
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let app = Router::new().route("/consulta", get(|| async { "<html>oops</html>" }));
        let base = spawn_upstream(app).await;

        let err = provider(&base).fetch(&telefone_query()).await.unwrap_err();
        assert_eq!(err, UpstreamError::Malformed);
    }
}
