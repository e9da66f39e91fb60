//! Student enrollment and class-record entry.
//!
//! These are the writes that feed the Promotion Engine: a student is enrolled
//! into a class, and at the end of a session a class record captures the
//! class they held and their outcome.

use tracing::info;

use crate::{
  Error, Result,
  school::{SessionId, StudentId},
  store::SchoolStore,
  student::{ClassRecord, NewClassRecord, NewStudent, Student},
  template::normalize_class_name,
};

fn normalize_preference(preferred: Option<String>) -> Option<String> {
  preferred
    .map(|p| normalize_class_name(&p))
    .filter(|p| !p.is_empty())
}

/// Enroll a student into a class. Grade and session follow from the class.
pub async fn enroll_student<S: SchoolStore>(
  store: &S,
  mut input: NewStudent,
) -> Result<Student> {
  input.first_name = input.first_name.trim().to_owned();
  input.last_name = input.last_name.trim().to_owned();
  if input.first_name.is_empty() || input.last_name.is_empty() {
    return Err(Error::InvalidInput("student names must not be empty".into()));
  }
  input.preferred_class = normalize_preference(input.preferred_class);

  let class_id = input.class_id;
  let student = store
    .create_student(input)
    .await
    .map_err(Error::store)?
    .ok_or(Error::ClassNotFound(class_id))?;

  info!(student_id = student.id, class_id, session_id = student.session_id, "enrolled student");
  Ok(student)
}

pub async fn get_student<S: SchoolStore>(store: &S, id: StudentId) -> Result<Student> {
  store
    .get_student(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::StudentNotFound(id))
}

pub async fn list_students<S: SchoolStore>(
  store: &S,
  session_id: Option<SessionId>,
) -> Result<Vec<Student>> {
  store.list_students(session_id).await.map_err(Error::store)
}

/// Set or clear the class a student wants at the junior/senior boundary.
pub async fn set_preferred_class<S: SchoolStore>(
  store: &S,
  id: StudentId,
  preferred_class: Option<String>,
) -> Result<Student> {
  store
    .set_preferred_class(id, normalize_preference(preferred_class))
    .await
    .map_err(Error::store)?
    .ok_or(Error::StudentNotFound(id))
}

/// Record (or re-record) a student's outcome for a session.
///
/// The class must belong to the session; the record is the frozen snapshot
/// later read by the Promotion Engine.
pub async fn record_outcome<S: SchoolStore>(
  store: &S,
  mut input: NewClassRecord,
) -> Result<ClassRecord> {
  store
    .get_student(input.student_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::StudentNotFound(input.student_id))?;

  store
    .get_session(input.session_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::SessionNotFound(input.session_id))?;

  let tree = store
    .grade_tree(input.session_id)
    .await
    .map_err(Error::store)?;
  if !tree
    .iter()
    .flat_map(|g| g.classes.iter())
    .any(|c| c.id == input.class_id)
  {
    return Err(Error::InvalidInput(format!(
      "class {} does not belong to session {}",
      input.class_id, input.session_id
    )));
  }

  input.remark = input
    .remark
    .map(|r| r.trim().to_owned())
    .filter(|r| !r.is_empty());

  store.upsert_class_record(input).await.map_err(Error::store)
}

pub async fn list_class_records<S: SchoolStore>(
  store: &S,
  session_id: SessionId,
) -> Result<Vec<ClassRecord>> {
  store.list_class_records(session_id).await.map_err(Error::store)
}
