use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::{MethodRouter, get},
};

use crate::{
    AppState,
    endpoints::Endpoint,
    error::ApiError,
    utils::success_to_api_response,
};

use super::model::LookupParams;

/// 为端点生成 GET 路由，所有端点共用同一处理流程
pub fn lookup_route(endpoint: &'static Endpoint) -> MethodRouter<AppState> {
    get(
        move |State(state): State<AppState>, Query(params): Query<LookupParams>| {
            lookup(state, endpoint, params)
        },
    )
}

async fn lookup(
    state: AppState,
    endpoint: &'static Endpoint,
    params: LookupParams,
) -> Result<impl IntoResponse, ApiError> {
    let debug = state.config.debug;

    let caller = state
        .gate
        .resolve(params.key())
        .await
        .map_err(|e| ApiError::from_gate(e, debug))?;

    let argument = params
        .argument(endpoint.query_param)
        .and_then(|raw| endpoint.normalize(raw))
        .ok_or_else(|| ApiError::bad_request("Parâmetro de consulta ausente ou inválido"))?;

    let served = state
        .gate
        .serve(&caller, endpoint, &argument, state.upstream.as_ref())
        .await
        .map_err(|e| ApiError::from_gate(e, debug))?;

    tracing::info!(
        "Served {} for {} (cached: {}, remaining: {})",
        endpoint.name,
        caller.user_id,
        served.cached,
        served.remaining
    );
    Ok(success_to_api_response(served))
}
