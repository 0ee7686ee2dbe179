use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use ranker::ranking::{ErrorClass, RankingError};
use ranker::storage::StorageError;

use crate::gateway::RANKER_STATUS_HEADER;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("ranking failed: {0}")]
    Ranking(#[from] RankingError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl GatewayError {
    /// HTTP status and the value of the status header.
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::Ranking(e) => match e.class() {
                ErrorClass::InvalidInput => (StatusCode::BAD_REQUEST, "invalid_input"),
                ErrorClass::Timeout => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
                ErrorClass::Encoding => (StatusCode::INTERNAL_SERVER_ERROR, "encoding_error"),
                ErrorClass::Initialization => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "initialization_error")
                }
            },
            GatewayError::Storage(StorageError::StaleResultSet { .. }) => {
                (StatusCode::CONFLICT, "superseded")
            }
            GatewayError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            GatewayError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            GatewayError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, ranker_status) = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let mut headers = HeaderMap::new();
        headers.insert(RANKER_STATUS_HEADER, HeaderValue::from_static(ranker_status));

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
