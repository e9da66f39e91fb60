//! Session lifecycle: creating a new academic session and the reads around it.
//!
//! Creating a session deactivates the previous current session and seeds the
//! new one from a [`SchoolTemplate`]. The store writes the whole seed in one
//! transaction, so the at-most-one-current invariant holds and a failure never
//! leaves a half-seeded session behind.

use tracing::{debug, info};

use crate::{
  Error, Result,
  school::{Session, SessionId, SessionTree},
  store::SchoolStore,
  template::SchoolTemplate,
};

/// Create a session called `name` (trimmed) and make it current.
///
/// Fails with [`Error::InvalidInput`] for a blank name and
/// [`Error::DuplicateSession`] if any session, deleted or not, already has the
/// name. Neither failure writes anything. Any store failure during creation is
/// reported as [`Error::CreationFailed`] with the cause attached.
pub async fn create_new_session<S: SchoolStore>(
  store: &S,
  template: &SchoolTemplate,
  name: &str,
) -> Result<Session> {
  let name = name.trim();
  if name.is_empty() {
    return Err(Error::InvalidInput("session name must not be empty".into()));
  }
  template.validate()?;

  if store
    .find_session_by_name(name)
    .await
    .map_err(Error::store)?
    .is_some()
  {
    return Err(Error::DuplicateSession(name.to_owned()));
  }

  let plan = template.session_plan(name);
  for grade in &plan.grades {
    debug!(session = name, grade = %grade.name, classes = ?grade.classes, "seeding grade");
  }

  // The store repeats the name check inside its transaction, so a concurrent
  // create with the same name still ends as a duplicate.
  let session = store
    .create_session(plan)
    .await
    .map_err(|e| Error::CreationFailed { name: name.to_owned(), source: Some(Box::new(e)) })?
    .ok_or_else(|| Error::DuplicateSession(name.to_owned()))?;

  if session.id <= 0 {
    return Err(Error::CreationFailed { name: name.to_owned(), source: None });
  }

  info!(
    session_id = session.id,
    session = %session.name,
    terms = template.terms.len(),
    grades = template.grades.len(),
    "created session"
  );
  Ok(session)
}

/// Sessions, oldest first.
pub async fn list_sessions<S: SchoolStore>(
  store: &S,
  include_deleted: bool,
) -> Result<Vec<Session>> {
  store.list_sessions(include_deleted).await.map_err(Error::store)
}

pub async fn current_session<S: SchoolStore>(store: &S) -> Result<Option<Session>> {
  store.current_session().await.map_err(Error::store)
}

/// A session by id, deleted or not.
pub async fn get_session<S: SchoolStore>(store: &S, id: SessionId) -> Result<Session> {
  store
    .get_session(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::SessionNotFound(id))
}

/// A session with its terms and grade/class tree.
pub async fn session_tree<S: SchoolStore>(
  store: &S,
  id: SessionId,
) -> Result<SessionTree> {
  let session = get_session(store, id).await?;
  let terms = store.list_terms(id).await.map_err(Error::store)?;
  let grades = store.grade_tree(id).await.map_err(Error::store)?;
  Ok(SessionTree { session, terms, grades })
}

/// Soft-delete a session. The current session cannot be deleted.
pub async fn delete_session<S: SchoolStore>(store: &S, id: SessionId) -> Result<Session> {
  let session = get_session(store, id).await?;
  if session.is_current {
    return Err(Error::SessionIsCurrent(id));
  }
  if !store.soft_delete_session(id).await.map_err(Error::store)? {
    return Err(Error::SessionNotFound(id));
  }
  info!(session_id = id, session = %session.name, "deleted session");
  Ok(Session { is_deleted: true, ..session })
}
