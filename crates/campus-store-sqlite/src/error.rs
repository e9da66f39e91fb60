//! Error type for `campus-store-sqlite`.

use campus_core::school::StudentId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown promotion status: {0:?}")]
  UnknownPromotion(String),

  /// A placement named a class, grade, and session that do not belong
  /// together, or a student that does not exist.
  #[error("inconsistent placement for student {0}")]
  InconsistentPlacement(StudentId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
