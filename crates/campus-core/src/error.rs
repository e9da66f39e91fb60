//! Error types for `campus-core`.

use thiserror::Error;

use crate::school::{ClassId, SessionId, StudentId};

/// A boxed backend error, as carried by [`Error::Store`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("a session named {0:?} already exists")]
  DuplicateSession(String),

  #[error("failed to create session {name:?}")]
  CreationFailed {
    name:   String,
    #[source]
    source: Option<BoxError>,
  },

  #[error("session not found: {0}")]
  SessionNotFound(SessionId),

  #[error("no promoted students recorded for session {0}")]
  NoPromotedStudents(SessionId),

  #[error("session {0} is the current session")]
  SessionIsCurrent(SessionId),

  #[error("class not found: {0}")]
  ClassNotFound(ClassId),

  #[error("student not found: {0}")]
  StudentNotFound(StudentId),

  #[error("class name {0:?} appears more than once in the session")]
  DuplicateClassName(String),

  #[error("invalid school template: {0}")]
  InvalidTemplate(String),

  #[error("store error: {0}")]
  Store(#[source] BoxError),
}

impl Error {
  /// Wrap a backend error.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
