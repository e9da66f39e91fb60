//! The `SchoolStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `campus-store-sqlite`).
//! The engines in [`crate::session`] and [`crate::promotion`] and the HTTP
//! layer depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  school::{GradeTree, NewSession, Session, SessionId, StudentId, Term},
  student::{ClassRecord, NewClassRecord, NewStudent, Placement, PromotedRecord, Student},
};

/// Abstraction over a school records backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SchoolStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Persist a new session with its terms, grades, and classes.
  ///
  /// Must be atomic: every current session is deactivated and the new one is
  /// inserted as current, together with its whole seed, or nothing is written.
  /// Returns `None` without writing if a session with the name already exists.
  fn create_session(
    &self,
    input: NewSession,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// Look up a session by exact name, including soft-deleted sessions.
  fn find_session_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + 'a;

  /// Retrieve a session by id, including soft-deleted sessions.
  fn get_session(
    &self,
    id: SessionId,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// The session flagged current, if any.
  fn current_session(
    &self,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// All sessions, oldest first.
  fn list_sessions(
    &self,
    include_deleted: bool,
  ) -> impl Future<Output = Result<Vec<Session>, Self::Error>> + Send + '_;

  /// Set the soft-delete flag. Returns `false` if the session does not exist.
  fn soft_delete_session(
    &self,
    id: SessionId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Terms of a session in creation order.
  fn list_terms(
    &self,
    session_id: SessionId,
  ) -> impl Future<Output = Result<Vec<Term>, Self::Error>> + Send + '_;

  /// Grades of a session with their classes, in creation order.
  fn grade_tree(
    &self,
    session_id: SessionId,
  ) -> impl Future<Output = Result<Vec<GradeTree>, Self::Error>> + Send + '_;

  // ── Students ──────────────────────────────────────────────────────────

  /// Enroll a student. Grade and session are taken from the class. Returns
  /// `None` if the class does not exist.
  fn create_student(
    &self,
    input: NewStudent,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  fn get_student(
    &self,
    id: StudentId,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  /// Students, optionally restricted to those enrolled in one session.
  fn list_students(
    &self,
    session_id: Option<SessionId>,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  /// Replace a student's preferred class. Returns `None` if the student does
  /// not exist.
  fn set_preferred_class(
    &self,
    id: StudentId,
    preferred_class: Option<String>,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  /// Apply computed placements in a single transaction and return the updated
  /// students. The store rejects any placement whose class, grade, and
  /// session do not agree.
  fn apply_placements<'a>(
    &'a self,
    placements: &'a [Placement],
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + 'a;

  // ── Class records ─────────────────────────────────────────────────────

  /// Insert or replace the record for `(student_id, session_id)`.
  fn upsert_class_record(
    &self,
    input: NewClassRecord,
  ) -> impl Future<Output = Result<ClassRecord, Self::Error>> + Send + '_;

  fn list_class_records(
    &self,
    session_id: SessionId,
  ) -> impl Future<Output = Result<Vec<ClassRecord>, Self::Error>> + Send + '_;

  /// Records of `session_id` marked PROMOTED, joined with the class name held
  /// that session and the student's preferred class.
  fn promoted_records(
    &self,
    session_id: SessionId,
  ) -> impl Future<Output = Result<Vec<PromotedRecord>, Self::Error>> + Send + '_;
}
