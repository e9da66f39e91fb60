//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use campus_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error(transparent)]
  Core(#[from] CoreError),
}

/// HTTP status for an engine or store error.
pub fn status_of(err: &CoreError) -> StatusCode {
  match err {
    CoreError::InvalidInput(_) | CoreError::InvalidTemplate(_) => StatusCode::BAD_REQUEST,
    CoreError::DuplicateSession(_) | CoreError::SessionIsCurrent(_) => StatusCode::CONFLICT,
    CoreError::SessionNotFound(_)
    | CoreError::ClassNotFound(_)
    | CoreError::StudentNotFound(_) => StatusCode::NOT_FOUND,
    CoreError::DuplicateClassName(_) => StatusCode::UNPROCESSABLE_ENTITY,
    CoreError::NoPromotedStudents(_) => StatusCode::OK,
    CoreError::CreationFailed { .. } | CoreError::Store(_) => {
      StatusCode::INTERNAL_SERVER_ERROR
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Core(e) => (status_of(e), e.to_string()),
    };
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": message }))).into_response()
  }
}
