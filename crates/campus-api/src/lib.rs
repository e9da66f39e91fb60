//! JSON REST API for Campus.
//!
//! Exposes an axum [`Router`] backed by any [`campus_core::store::SchoolStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", campus_api::api_router(store.clone(), template))
//! ```

pub mod action;
pub mod class_records;
pub mod error;
pub mod promotions;
pub mod sessions;
pub mod students;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use campus_core::{store::SchoolStore, template::SchoolTemplate};

pub use action::ActionResult;
pub use error::ApiError;

/// Shared state threaded through all API handlers.
pub struct ApiState<S> {
  pub store:    Arc<S>,
  pub template: Arc<SchoolTemplate>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), template: Arc::clone(&self.template) }
  }
}

/// Build a fully-materialised API router for `store`, seeding new sessions
/// from `template`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, template: Arc<SchoolTemplate>) -> Router<()>
where
  S: SchoolStore + 'static,
{
  Router::new()
    // Sessions
    .route("/sessions", get(sessions::list::<S>).post(sessions::create::<S>))
    .route("/sessions/current", get(sessions::current::<S>))
    .route(
      "/sessions/{id}",
      get(sessions::get_one::<S>).delete(sessions::delete_one::<S>),
    )
    // Promotion
    .route("/promotions", post(promotions::create::<S>))
    // Students
    .route("/students", get(students::list::<S>).post(students::create::<S>))
    .route("/students/{id}", get(students::get_one::<S>))
    .route(
      "/students/{id}/preferred-class",
      put(students::set_preferred_class::<S>),
    )
    // Class records
    .route(
      "/class-records",
      get(class_records::list::<S>).post(class_records::upsert::<S>),
    )
    .with_state(ApiState { store, template })
}

#[cfg(test)]
mod tests;
