//! Handlers for `/sessions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/sessions` | Optional `?include_deleted=true` |
//! | `POST`   | `/sessions` | Body: `{"name":"2025/2026"}`; replies with an [`ActionResult`] |
//! | `GET`    | `/sessions/current` | 404 if no session is current |
//! | `GET`    | `/sessions/:id` | Session with terms and grade/class tree |
//! | `DELETE` | `/sessions/:id` | Soft delete; 409 for the current session |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
};
use campus_core::{
  school::{Session, SessionId, SessionTree},
  session,
  store::SchoolStore,
};
use serde::Deserialize;

use crate::{
  ApiState,
  action::{ActionResult, Reply},
  error::ApiError,
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub include_deleted: bool,
}

/// `GET /sessions[?include_deleted=true]`
pub async fn list<S: SchoolStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Session>>, ApiError> {
  let sessions = session::list_sessions(&*state.store, params.include_deleted).await?;
  Ok(Json(sessions))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
}

/// `POST /sessions` — creates the session, makes it current, and seeds it.
pub async fn create<S: SchoolStore>(
  State(state): State<ApiState<S>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Reply {
  let Json(body) = match body {
    Ok(body) => body,
    Err(rejection) => return Reply::rejected(rejection),
  };
  match session::create_new_session(&*state.store, &state.template, &body.name).await {
    Ok(created) => Reply::created(ActionResult {
      message: Some(format!("session {} created", created.name)),
      session: Some(created),
      ..ActionResult::default()
    }),
    Err(e) => Reply::failure(e),
  }
}

// ─── Current ──────────────────────────────────────────────────────────────────

/// `GET /sessions/current`
pub async fn current<S: SchoolStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Session>, ApiError> {
  let current = session::current_session(&*state.store)
    .await?
    .ok_or_else(|| ApiError::NotFound("no current session".into()))?;
  Ok(Json(current))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /sessions/:id`
pub async fn get_one<S: SchoolStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<SessionId>,
) -> Result<Json<SessionTree>, ApiError> {
  Ok(Json(session::session_tree(&*state.store, id).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /sessions/:id`
pub async fn delete_one<S: SchoolStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<SessionId>,
) -> Result<Json<Session>, ApiError> {
  Ok(Json(session::delete_session(&*state.store, id).await?))
}
