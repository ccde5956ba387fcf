use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{
    AppState,
    config::Config,
    endpoints,
    middleware::{check_origin, log_errors},
    routes,
};

// 查询相关的路由，需要校验来源
pub fn lookup_routes(state: &AppState) -> Router<AppState> {
    endpoints::ALL
        .iter()
        .fold(Router::new(), |router, &endpoint| {
            router.route(
                &format!("/{}", endpoint.name),
                routes::lookup::lookup_route(endpoint),
            )
        })
        .layer(axum::middleware::from_fn_with_state(
            state.config.clone(),
            check_origin,
        ))
}

// 状态探针路由
pub fn status_routes() -> Router<AppState> {
    Router::new().route("/teste", get(routes::status::teste))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    // 无法作为响应头的来源不放行任何跨域请求
    match HeaderValue::from_str(&config.allowed_origin) {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            tracing::warn!("ALLOWED_ORIGIN is not a valid header value, CORS disabled");
            cors.allow_origin(AllowOrigin::list(Vec::<HeaderValue>::new()))
        }
    }
}

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(lookup_routes(&state))
        .merge(status_routes());

    let base = state.config.api_base_uri.trim_end_matches('/');
    let router = if base.is_empty() {
        api
    } else {
        Router::new().nest(base, api)
    };

    router
        .layer(axum::middleware::from_fn(log_errors))
        .layer(cors_layer(&state.config))
        .with_state(state)
}
