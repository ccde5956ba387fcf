use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{config::Config, error::ApiError};

/// 校验请求来源，Origin 或 Referer 必须包含 ALLOWED_ORIGIN
pub async fn check_origin(
    State(config): State<Arc<Config>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let allowed = config.allowed_origin.as_str();

    // 优先使用 Origin，缺失时退回 Referer
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .or_else(|| req.headers().get(header::REFERER))
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned);

    match origin {
        Some(ref origin) if origin.contains(allowed) => next.run(req).await,
        _ => {
            tracing::info!("Rejected request from origin {:?}", origin);
            ApiError::forbidden_origin().into_response()
        }
    }
}
