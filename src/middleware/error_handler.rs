use axum::{
    body::{Body, to_bytes},
    http::Request,
    middleware::Next,
    response::Response,
};
use serde_json::Value;

/// 错误响应体的读取上限
const MAX_LOGGED_BODY: usize = 4096;

// 从错误响应体中取出 `error` 字段，非 JSON 时原样输出
fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned())
}

/// 记录 5xx 响应，不输出查询串（其中带有调用者的 key）
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let response = next.run(req).await;

    if !response.status().is_server_error() {
        return response;
    }

    let (parts, body) = response.into_parts();
    match to_bytes(body, MAX_LOGGED_BODY).await {
        Ok(bytes) => {
            tracing::error!(
                "{} {} answered {}: {}",
                method,
                path,
                parts.status,
                error_message(&bytes)
            );
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            tracing::error!("{} {} answered {} (body unreadable: {})", method, path, parts.status, e);
            Response::from_parts(parts, Body::empty())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::StatusCode, routing::get};
    use tower::ServiceExt;
    use tracing_test::traced_test;

    fn app() -> Router {
        Router::new()
            .route(
                "/falha",
                get(|| async {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        axum::Json(serde_json::json!({"status": false, "error": "Erro interno"})),
                    )
                }),
            )
            .route("/ok", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn(log_errors))
    }

    #[traced_test]
    #[tokio::test]
    async fn server_errors_are_logged_without_query() {
        let request = Request::get("/falha?key=abc").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(error_message(&body), "Erro interno");
        assert!(logs_contain("GET /falha answered 500 Internal Server Error: Erro interno"));
        assert!(!logs_contain("key=abc"));
    }

    #[traced_test]
    #[tokio::test]
    async fn successful_responses_are_not_logged() {
        let request = Request::get("/ok").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(!logs_contain("answered"));
    }

    #[test]
    fn plain_text_bodies_are_logged_verbatim() {
        assert_eq!(error_message(b"upstream exploded"), "upstream exploded");
    }
}
