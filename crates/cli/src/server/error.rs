//! Error types for the HTTP boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use contracts::ContractError;
use dispatcher::DispatcherError;
use thiserror::Error;
use tracing::error;

use crate::server::api_types::ErrorResponse;

/// Request-level failures, each mapped to one status code
#[derive(Debug, Error)]
pub enum ApiError {
    /// No admin secret configured on this instance
    #[error("admin secret not configured")]
    AdminNotConfigured,

    /// Admin secret header missing or wrong
    #[error("admin password required")]
    Forbidden,

    /// Body could not be decoded
    #[error(transparent)]
    Payload(#[from] ContractError),

    /// Snapshot could not be published
    #[error("broadcast failed: {0}")]
    Broadcast(#[from] DispatcherError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::AdminNotConfigured | Self::Broadcast(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Payload(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
