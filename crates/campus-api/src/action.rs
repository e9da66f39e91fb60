//! The tagged result shape returned by the session and promotion procedures.
//!
//! ```json
//! { "success": true, "message": "...", "session": {...} }
//! { "success": true, "updatedStudents": [...], "skipped": [...] }
//! { "success": false, "message": "a session named \"2025/2026\" already exists" }
//! ```

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use campus_core::{
  Error as CoreError, promotion::SkippedStudent, school::Session, student::Student,
};
use serde::{Deserialize, Serialize};

use crate::error::status_of;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
  pub success:          bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub session:          Option<Session>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_students: Option<Vec<Student>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub skipped:          Option<Vec<SkippedStudent>>,
}

/// An [`ActionResult`] with the status code it is sent with.
pub struct Reply(pub StatusCode, pub ActionResult);

impl Reply {
  pub fn ok(result: ActionResult) -> Self {
    Self(StatusCode::OK, ActionResult { success: true, ..result })
  }

  pub fn created(result: ActionResult) -> Self {
    Self(StatusCode::CREATED, ActionResult { success: true, ..result })
  }

  /// Convert an engine error into a failed result. No error escapes as
  /// anything other than this shape.
  pub fn failure(err: CoreError) -> Self {
    let status = status_of(&err);
    if status.is_server_error() {
      tracing::error!(error = %err, source = ?std::error::Error::source(&err), "procedure failed");
    }
    let updated_students = matches!(err, CoreError::NoPromotedStudents(_)).then(Vec::new);
    Self(status, ActionResult {
      success: false,
      message: Some(err.to_string()),
      updated_students,
      ..ActionResult::default()
    })
  }

  /// A body that is not valid JSON for the procedure.
  pub fn rejected(rejection: JsonRejection) -> Self {
    Self(StatusCode::BAD_REQUEST, ActionResult {
      success: false,
      message: Some(rejection.body_text()),
      ..ActionResult::default()
    })
  }
}

impl IntoResponse for Reply {
  fn into_response(self) -> Response { (self.0, Json(self.1)).into_response() }
}
