//! Handlers for `/students` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/students` | Optional `?session_id=<id>` |
//! | `POST` | `/students` | Body: [`NewStudent`]; returns 201 |
//! | `GET`  | `/students/:id` | 404 if not found |
//! | `PUT`  | `/students/:id/preferred-class` | Body: `{"preferred_class":"SSS1 B"}` or `null` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use campus_core::{
  records,
  school::{SessionId, StudentId},
  store::SchoolStore,
  student::{NewStudent, Student},
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub session_id: Option<SessionId>,
}

/// `GET /students[?session_id=<id>]`
pub async fn list<S: SchoolStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Student>>, ApiError> {
  Ok(Json(records::list_students(&*state.store, params.session_id).await?))
}

/// `POST /students`
pub async fn create<S: SchoolStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewStudent>,
) -> Result<impl IntoResponse, ApiError> {
  let student = records::enroll_student(&*state.store, body).await?;
  Ok((StatusCode::CREATED, Json(student)))
}

/// `GET /students/:id`
pub async fn get_one<S: SchoolStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<StudentId>,
) -> Result<Json<Student>, ApiError> {
  Ok(Json(records::get_student(&*state.store, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct PreferredClassBody {
  pub preferred_class: Option<String>,
}

/// `PUT /students/:id/preferred-class`
pub async fn set_preferred_class<S: SchoolStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<StudentId>,
  Json(body): Json<PreferredClassBody>,
) -> Result<Json<Student>, ApiError> {
  let student = records::set_preferred_class(&*state.store, id, body.preferred_class).await?;
  Ok(Json(student))
}
