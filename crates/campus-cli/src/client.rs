//! Async HTTP client wrapping the campus JSON API.

use anyhow::{Context, Result, anyhow, bail};
use campus_core::{
  promotion::SkippedStudent,
  school::{Session, SessionId, SessionTree, StudentId},
  student::{ClassRecord, PromotionStatus, Student},
};
use reqwest::{Client, Response};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use std::time::Duration;

/// Connection settings for the campus API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Tagged reply of the session and promotion procedures.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionReply {
  pub success:          bool,
  pub message:          Option<String>,
  pub session:          Option<Session>,
  pub updated_students: Option<Vec<Student>>,
  pub skipped:          Option<Vec<SkippedStudent>>,
}

/// Async HTTP client for the campus JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

/// Decode a resource reply, turning `{"error": ...}` bodies into errors.
async fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
  let status = resp.status();
  if !status.is_success() {
    let body: serde_json::Value = resp.json().await.unwrap_or_default();
    let message = body["error"].as_str().unwrap_or("no details");
    bail!("{what} → {status}: {message}");
  }
  resp.json().await.with_context(|| format!("deserialising {what}"))
}

/// Decode an [`ActionReply`], which carries its own failure message.
async fn decode_action(resp: Response, what: &str) -> Result<ActionReply> {
  let status = resp.status();
  let reply: ActionReply = resp
    .json()
    .await
    .with_context(|| format!("{what} → {status}: unreadable reply"))?;
  if !reply.success {
    return Err(anyhow!(
      "{what} → {status}: {}",
      reply.message.as_deref().unwrap_or("failed")
    ));
  }
  Ok(reply)
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  /// `GET /api/sessions`
  pub async fn list_sessions(&self, include_deleted: bool) -> Result<Vec<Session>> {
    let resp = self
      .client
      .get(self.url("/sessions"))
      .query(&[("include_deleted", include_deleted)])
      .send()
      .await
      .context("GET /sessions failed")?;
    decode(resp, "GET /sessions").await
  }

  /// `POST /api/sessions`
  pub async fn create_session(&self, name: &str) -> Result<ActionReply> {
    let resp = self
      .client
      .post(self.url("/sessions"))
      .json(&json!({ "name": name }))
      .send()
      .await
      .context("POST /sessions failed")?;
    decode_action(resp, "POST /sessions").await
  }

  /// `GET /api/sessions/current`
  pub async fn current_session(&self) -> Result<Session> {
    let resp = self
      .client
      .get(self.url("/sessions/current"))
      .send()
      .await
      .context("GET /sessions/current failed")?;
    decode(resp, "GET /sessions/current").await
  }

  /// `GET /api/sessions/:id`
  pub async fn session_tree(&self, id: SessionId) -> Result<SessionTree> {
    let resp = self
      .client
      .get(self.url(&format!("/sessions/{id}")))
      .send()
      .await
      .context("GET /sessions/:id failed")?;
    decode(resp, "GET /sessions/:id").await
  }

  /// `DELETE /api/sessions/:id`
  pub async fn delete_session(&self, id: SessionId) -> Result<Session> {
    let resp = self
      .client
      .delete(self.url(&format!("/sessions/{id}")))
      .send()
      .await
      .context("DELETE /sessions/:id failed")?;
    decode(resp, "DELETE /sessions/:id").await
  }

  // ── Promotion ─────────────────────────────────────────────────────────────

  /// `POST /api/promotions`
  pub async fn promote(&self, last: SessionId, new: SessionId) -> Result<ActionReply> {
    let resp = self
      .client
      .post(self.url("/promotions"))
      .json(&json!({ "lastSessionId": last, "newSessionId": new }))
      .send()
      .await
      .context("POST /promotions failed")?;
    decode_action(resp, "POST /promotions").await
  }

  // ── Students ──────────────────────────────────────────────────────────────

  /// `GET /api/students[?session_id=<id>]`
  pub async fn list_students(&self, session_id: Option<SessionId>) -> Result<Vec<Student>> {
    let mut req = self.client.get(self.url("/students"));
    if let Some(id) = session_id {
      req = req.query(&[("session_id", id)]);
    }
    let resp = req.send().await.context("GET /students failed")?;
    decode(resp, "GET /students").await
  }

  /// `POST /api/students`
  pub async fn enroll(
    &self,
    first_name: &str,
    last_name: &str,
    class_id: i64,
    preferred_class: Option<&str>,
  ) -> Result<Student> {
    let resp = self
      .client
      .post(self.url("/students"))
      .json(&json!({
        "first_name": first_name,
        "last_name": last_name,
        "class_id": class_id,
        "preferred_class": preferred_class,
      }))
      .send()
      .await
      .context("POST /students failed")?;
    decode(resp, "POST /students").await
  }

  /// `PUT /api/students/:id/preferred-class`
  pub async fn set_preferred_class(
    &self,
    id: StudentId,
    preferred_class: Option<&str>,
  ) -> Result<Student> {
    let resp = self
      .client
      .put(self.url(&format!("/students/{id}/preferred-class")))
      .json(&json!({ "preferred_class": preferred_class }))
      .send()
      .await
      .context("PUT /students/:id/preferred-class failed")?;
    decode(resp, "PUT /students/:id/preferred-class").await
  }

  // ── Class records ─────────────────────────────────────────────────────────

  /// `POST /api/class-records`
  pub async fn record_outcome(
    &self,
    student_id: StudentId,
    session_id: SessionId,
    class_id: i64,
    promotion: PromotionStatus,
    remark: Option<&str>,
  ) -> Result<ClassRecord> {
    let resp = self
      .client
      .post(self.url("/class-records"))
      .json(&json!({
        "student_id": student_id,
        "session_id": session_id,
        "class_id": class_id,
        "promotion": promotion,
        "remark": remark,
      }))
      .send()
      .await
      .context("POST /class-records failed")?;
    decode(resp, "POST /class-records").await
  }

  /// `GET /api/class-records?session_id=<id>`
  pub async fn list_class_records(&self, session_id: SessionId) -> Result<Vec<ClassRecord>> {
    let resp = self
      .client
      .get(self.url("/class-records"))
      .query(&[("session_id", session_id)])
      .send()
      .await
      .context("GET /class-records failed")?;
    decode(resp, "GET /class-records").await
  }
}
