use axum::Json;
use serde::Serialize;

use crate::gate::Served;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: bool,
    pub data: T,
    pub cached: bool,
    pub requests_remaining: i64,
}

pub fn success_to_api_response(served: Served) -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse {
        status: true,
        data: served.payload,
        cached: served.cached,
        requests_remaining: served.remaining,
    })
}
