//! Admin API error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::bundle::BundleError;
use crate::error::EngineError;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error("no routes found")]
    NoRoutes,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("missing or invalid bearer token")]
    Unauthorized,
}

impl AdminError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AdminError::Engine(e) | AdminError::Bundle(BundleError::Engine(e)) => match e {
                EngineError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
                EngineError::MalformedPluginData { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "malformed_plugin_data")
                }
                EngineError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_failure"),
            },
            AdminError::Bundle(_) => (StatusCode::BAD_REQUEST, "invalid_bundle"),
            AdminError::NoRoutes => (StatusCode::NOT_FOUND, "no_routes"),
            AdminError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AdminError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Admin request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Admin request rejected");
        }

        let body = json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}
