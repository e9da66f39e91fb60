//! HTTP server assembly for Campus: configuration and the top-level router.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Json, Router, routing::get};
use campus_core::{store::SchoolStore, template::SchoolTemplate};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CAMPUS_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// School structure seeded into new sessions.
  pub template:   SchoolTemplate,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       8080,
      store_path: PathBuf::from("campus.sqlite3"),
      template:   SchoolTemplate::default(),
    }
  }
}

/// `CAMPUS_`-prefixed environment overrides, e.g. `CAMPUS_PORT=9000`. Keys
/// nested under `template` use `__`.
pub fn environment() -> config::Environment {
  config::Environment::with_prefix("CAMPUS")
    .prefix_separator("_")
    .separator("__")
    .try_parsing(true)
}

/// Layer the (optional) TOML file at `file` under `env`.
pub fn load_config(
  file: &Path,
  env: config::Environment,
) -> Result<ServerConfig, config::ConfigError> {
  config::Config::builder()
    .add_source(config::File::from(file).required(false))
    .add_source(env)
    .build()?
    .try_deserialize()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the server's router: the JSON API under `/api` plus a health probe.
pub fn router<S>(store: Arc<S>, template: Arc<SchoolTemplate>) -> Router
where
  S: SchoolStore + 'static,
{
  Router::new()
    .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
    .nest("/api", campus_api::api_router(store, template))
    .layer(TraceLayer::new_for_http())
}
