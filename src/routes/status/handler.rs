use std::collections::HashMap;

use axum::{Json, extract::Query, http::Method};
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub request: RequestEcho,
    pub environment: Environment,
}

#[derive(Debug, Serialize)]
pub struct RequestEcho {
    pub method: String,
    pub query: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct Environment {
    pub version: &'static str,
    pub region: String,
}

/// 存活探针，不需要认证
#[axum::debug_handler]
pub async fn teste(
    method: Method,
    Query(query): Query<HashMap<String, String>>,
) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "API operacional",
        timestamp: Utc::now().to_rfc3339(),
        request: RequestEcho {
            method: method.to_string(),
            query,
        },
        environment: Environment {
            version: env!("CARGO_PKG_VERSION"),
            region: std::env::var("VERCEL_REGION").unwrap_or_else(|_| "local".into()),
        },
    })
}
