use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("api key missing")]
    MissingKey,
    #[error("api key not registered")]
    InvalidKey,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuotaError {
    #[error("request quota exhausted")]
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream did not answer in time")]
    Timeout,
    #[error("upstream answered with status {0}")]
    BadResponse(u16),
    #[error("upstream payload is malformed")]
    Malformed,
    #[error("upstream found no record")]
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("too many concurrent writers on one document")]
    Contended,
    #[error("stored document could not be decoded")]
    Corrupt,
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// 网关各阶段可能产生的错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Quota(#[from] QuotaError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// HTTP 层错误，`details` 仅在调试模式下返回
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
    details: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    status: bool,
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: &'static str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
            details: None,
        }
    }

    pub fn forbidden_origin() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: "Origem não autorizada",
            details: None,
        }
    }

    pub fn from_gate(err: GateError, debug: bool) -> Self {
        let (status, message) = match &err {
            GateError::Auth(AuthError::MissingKey) => {
                (StatusCode::BAD_REQUEST, "Parâmetro \"key\" obrigatório")
            }
            GateError::Auth(AuthError::InvalidKey) => (StatusCode::FORBIDDEN, "Chave API inválida"),
            GateError::Quota(QuotaError::Exhausted) => {
                (StatusCode::TOO_MANY_REQUESTS, "Limite de requests atingido")
            }
            GateError::Upstream(UpstreamError::Timeout) => {
                (StatusCode::GATEWAY_TIMEOUT, "Tempo esgotado na consulta")
            }
            GateError::Upstream(UpstreamError::NotFound) => {
                (StatusCode::NOT_FOUND, "Nenhum registro encontrado")
            }
            GateError::Upstream(UpstreamError::BadResponse(_) | UpstreamError::Malformed) => {
                (StatusCode::BAD_GATEWAY, "Falha ao acessar dados")
            }
            GateError::Store(cause) => {
                tracing::error!("Store failure: {}", cause);
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro interno")
            }
        };

        Self {
            status,
            message,
            details: debug.then(|| err.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            status: false,
            error: self.message,
            details: self.details,
        });

        (self.status, body).into_response()
    }
}
