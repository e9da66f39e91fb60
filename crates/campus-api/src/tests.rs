//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use campus_core::template::SchoolTemplate;
use campus_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  api_router(Arc::new(store), Arc::new(SchoolTemplate::default()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(b) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(b.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, json)
}

async fn create_session(app: &Router, name: &str) -> i64 {
  let (status, body) = send(app, "POST", "/sessions", Some(json!({ "name": name }))).await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["session"]["id"].as_i64().unwrap()
}

async fn class_id(app: &Router, session_id: i64, name: &str) -> i64 {
  let (_, tree) = send(app, "GET", &format!("/sessions/{session_id}"), None).await;
  tree["grades"]
    .as_array()
    .unwrap()
    .iter()
    .flat_map(|g| g["classes"].as_array().unwrap().iter())
    .find(|c| c["name"] == name)
    .and_then(|c| c["id"].as_i64())
    .unwrap()
}

async fn enroll(app: &Router, class_id: i64) -> Value {
  let (status, student) = send(
    app,
    "POST",
    "/students",
    Some(json!({ "first_name": "Ada", "last_name": "Okafor", "class_id": class_id })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{student}");
  student
}

#[tokio::test]
async fn create_session_returns_tagged_result() {
  let app = app().await;
  let (status, body) =
    send(&app, "POST", "/sessions", Some(json!({ "name": "2025/2026" }))).await;

  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["success"], true);
  assert_eq!(body["session"]["name"], "2025/2026");
  assert_eq!(body["session"]["is_current"], true);
  assert!(body.get("updatedStudents").is_none());
}

#[tokio::test]
async fn duplicate_session_conflicts() {
  let app = app().await;
  create_session(&app, "2025/2026").await;

  let (status, body) =
    send(&app, "POST", "/sessions", Some(json!({ "name": "2025/2026 " }))).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["success"], false);
  assert!(body["message"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn blank_session_name_is_bad_request() {
  let app = app().await;
  let (status, body) = send(&app, "POST", "/sessions", Some(json!({ "name": "" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["success"], false);
}

#[tokio::test]
async fn session_tree_and_current() {
  let app = app().await;
  create_session(&app, "2024/2025").await;
  let id = create_session(&app, "2025/2026").await;

  let (status, current) = send(&app, "GET", "/sessions/current", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(current["id"], id);

  let (_, tree) = send(&app, "GET", &format!("/sessions/{id}"), None).await;
  assert_eq!(tree["terms"].as_array().unwrap().len(), 3);
  assert_eq!(tree["grades"].as_array().unwrap().len(), 6);

  let (status, _) = send(&app, "GET", "/sessions/999", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn current_session_missing_is_404() {
  let app = app().await;
  let (status, body) = send(&app, "GET", "/sessions/current", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn delete_session_soft_deletes() {
  let app = app().await;
  let old = create_session(&app, "2024/2025").await;
  let new = create_session(&app, "2025/2026").await;

  let (status, _) = send(&app, "DELETE", &format!("/sessions/{new}"), None).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, deleted) = send(&app, "DELETE", &format!("/sessions/{old}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(deleted["is_deleted"], true);

  let (_, listed) = send(&app, "GET", "/sessions", None).await;
  assert_eq!(listed.as_array().unwrap().len(), 1);
  let (_, all) = send(&app, "GET", "/sessions?include_deleted=true", None).await;
  assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn promotion_round_trip() {
  let app = app().await;
  let old = create_session(&app, "2024/2025").await;
  let jss1a = class_id(&app, old, "JSS1 A").await;
  let student = enroll(&app, jss1a).await;

  let (status, record) = send(
    &app,
    "POST",
    "/class-records",
    Some(json!({
      "student_id": student["id"],
      "session_id": old,
      "class_id": jss1a,
      "promotion": "PROMOTED",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{record}");
  assert_eq!(record["promotion"], "PROMOTED");

  let new = create_session(&app, "2025/2026").await;
  let jss2a = class_id(&app, new, "JSS2 A").await;

  let (status, body) = send(
    &app,
    "POST",
    "/promotions",
    Some(json!({ "lastSessionId": old, "newSessionId": new })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["success"], true);
  let updated = body["updatedStudents"].as_array().unwrap();
  assert_eq!(updated.len(), 1);
  assert_eq!(updated[0]["class_id"], jss2a);
  assert_eq!(updated[0]["session_id"], new);

  let (_, listed) = send(&app, "GET", &format!("/students?session_id={new}"), None).await;
  assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn promotion_without_promoted_records_is_not_a_crash() {
  let app = app().await;
  let old = create_session(&app, "2024/2025").await;
  let new = create_session(&app, "2025/2026").await;

  let (status, body) = send(
    &app,
    "POST",
    "/promotions",
    Some(json!({ "lastSessionId": old, "newSessionId": new })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["success"], false);
  assert_eq!(body["updatedStudents"], json!([]));
  assert!(body["message"].is_string());
}

#[tokio::test]
async fn promotion_into_unknown_session_is_404() {
  let app = app().await;
  let old = create_session(&app, "2024/2025").await;
  let (status, body) = send(
    &app,
    "POST",
    "/promotions",
    Some(json!({ "last_session_id": old, "new_session_id": 77 })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["success"], false);
}

#[tokio::test]
async fn student_endpoints() {
  let app = app().await;
  let session = create_session(&app, "2025/2026").await;
  let jss3a = class_id(&app, session, "JSS3 A").await;
  let student = enroll(&app, jss3a).await;
  let id = student["id"].as_i64().unwrap();

  let (status, updated) = send(
    &app,
    "PUT",
    &format!("/students/{id}/preferred-class"),
    Some(json!({ "preferred_class": "sss1 b" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["preferred_class"], "SSS1 B");

  let (status, fetched) = send(&app, "GET", &format!("/students/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(fetched["preferred_class"], "SSS1 B");

  let (status, _) = send(&app, "GET", "/students/999", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send(
    &app,
    "POST",
    "/students",
    Some(json!({ "first_name": "Ada", "last_name": "Okafor", "class_id": 999 })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_procedure_bodies_get_tagged_failures() {
  let app = app().await;

  let (status, body) = send(
    &app,
    "POST",
    "/promotions",
    Some(json!({ "lastSessionId": "x" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["success"], false);
  assert!(body["message"].is_string());

  let (status, body) = send(&app, "POST", "/sessions", Some(json!({ "title": "2025/2026" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["success"], false);
  assert!(body["message"].is_string());

  let (_, listed) = send(&app, "GET", "/sessions", None).await;
  assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn promotion_into_deleted_session_is_404() {
  let app = app().await;
  let old = create_session(&app, "2024/2025").await;
  let abandoned = create_session(&app, "2025/2026").await;
  create_session(&app, "2026/2027").await;

  let (status, _) = send(&app, "DELETE", &format!("/sessions/{abandoned}"), None).await;
  assert_eq!(status, StatusCode::OK);

  let (status, body) = send(
    &app,
    "POST",
    "/promotions",
    Some(json!({ "lastSessionId": old, "newSessionId": abandoned })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["success"], false);
}
