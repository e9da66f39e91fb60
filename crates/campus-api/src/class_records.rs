//! Handlers for `/class-records`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/class-records?session_id=<id>` | All records of a session |
//! | `POST` | `/class-records` | Body: [`NewClassRecord`]; upsert per student per session |

use axum::{
  Json,
  extract::{Query, State},
};
use campus_core::{
  records,
  school::SessionId,
  store::SchoolStore,
  student::{ClassRecord, NewClassRecord},
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub session_id: SessionId,
}

/// `GET /class-records?session_id=<id>`
pub async fn list<S: SchoolStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ClassRecord>>, ApiError> {
  Ok(Json(records::list_class_records(&*state.store, params.session_id).await?))
}

/// `POST /class-records`
pub async fn upsert<S: SchoolStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewClassRecord>,
) -> Result<Json<ClassRecord>, ApiError> {
  Ok(Json(records::record_outcome(&*state.store, body).await?))
}
