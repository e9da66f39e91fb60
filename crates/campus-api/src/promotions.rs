//! Handler for `POST /promotions`.
//!
//! Body: `{"lastSessionId": 1, "newSessionId": 2}`. Replies with an
//! [`ActionResult`] carrying `updatedStudents` and `skipped`.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use campus_core::{promotion, school::SessionId, store::SchoolStore};
use serde::Deserialize;

use crate::{
  ApiState,
  action::{ActionResult, Reply},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteBody {
  #[serde(alias = "last_session_id")]
  pub last_session_id: SessionId,
  #[serde(alias = "new_session_id")]
  pub new_session_id:  SessionId,
}

/// `POST /promotions`
pub async fn create<S: SchoolStore>(
  State(state): State<ApiState<S>>,
  body: Result<Json<PromoteBody>, JsonRejection>,
) -> Reply {
  let Json(body) = match body {
    Ok(body) => body,
    Err(rejection) => return Reply::rejected(rejection),
  };
  let result = promotion::promote_and_transfer_students(
    &*state.store,
    &state.template,
    body.last_session_id,
    body.new_session_id,
  )
  .await;

  match result {
    Ok(outcome) => Reply::ok(ActionResult {
      message: Some(format!(
        "{} students promoted, {} skipped",
        outcome.updated.len(),
        outcome.skipped.len()
      )),
      updated_students: Some(outcome.updated),
      skipped: Some(outcome.skipped),
      ..ActionResult::default()
    }),
    Err(e) => Reply::failure(e),
  }
}
