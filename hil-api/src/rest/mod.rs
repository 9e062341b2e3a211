pub mod handlers;
pub mod routes;

use std::sync::Arc;

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::api::Orchestrator;
use crate::error::ApiError;

pub use routes::{ApiDoc, create_router};

/// Shared application state
pub struct AppState {
    pub api: Arc<Orchestrator>,
}

/// API error response
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    /// Error class, e.g. `not_found` or `driver`.
    pub kind: String,
    pub code: u16,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Duplicate(_) | ApiError::Blocked(_) => StatusCode::CONFLICT,
            ApiError::InvalidArgument(_) | ApiError::Schema(_) => StatusCode::BAD_REQUEST,
            ApiError::ResourceExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Driver { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Inconsistent(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.kind(), error = %self, "Request failed");
        }
        let body = ErrorBody {
            error: self.to_string(),
            kind: self.kind().to_string(),
            code: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}
