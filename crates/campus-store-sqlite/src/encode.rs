//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Promotion statuses are stored as
//! their SCREAMING_SNAKE names. Ids and flags map to SQLite's native integer
//! types.

use chrono::{DateTime, Utc};
use campus_core::{
  school::Session,
  student::{ClassRecord, PromotionStatus, Student},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── PromotionStatus ─────────────────────────────────────────────────────────

pub fn encode_promotion(p: PromotionStatus) -> String { p.to_string() }

pub fn decode_promotion(s: &str) -> Result<PromotionStatus> {
  s.parse()
    .map_err(|_| Error::UnknownPromotion(s.to_owned()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawSession::from_row`].
pub const SESSION_COLUMNS: &str = "id, name, is_current, is_deleted, created_at";

/// A `sessions` row before timestamp decoding.
pub struct RawSession {
  pub id:         i64,
  pub name:       String,
  pub is_current: bool,
  pub is_deleted: bool,
  pub created_at: String,
}

impl RawSession {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      is_current: row.get(2)?,
      is_deleted: row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      id:         self.id,
      name:       self.name,
      is_current: self.is_current,
      is_deleted: self.is_deleted,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`student_from_row`].
pub const STUDENT_COLUMNS: &str =
  "id, first_name, last_name, class_id, grade_id, session_id, preferred_class";

pub fn student_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Student> {
  Ok(Student {
    id:              row.get(0)?,
    first_name:      row.get(1)?,
    last_name:       row.get(2)?,
    class_id:        row.get(3)?,
    grade_id:        row.get(4)?,
    session_id:      row.get(5)?,
    preferred_class: row.get(6)?,
  })
}

/// Column list matching [`RawClassRecord::from_row`].
pub const RECORD_COLUMNS: &str =
  "id, student_id, session_id, class_id, promotion, remark";

/// A `class_records` row before status decoding.
pub struct RawClassRecord {
  pub id:         i64,
  pub student_id: i64,
  pub session_id: i64,
  pub class_id:   i64,
  pub promotion:  String,
  pub remark:     Option<String>,
}

impl RawClassRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      student_id: row.get(1)?,
      session_id: row.get(2)?,
      class_id:   row.get(3)?,
      promotion:  row.get(4)?,
      remark:     row.get(5)?,
    })
  }

  pub fn into_record(self) -> Result<ClassRecord> {
    Ok(ClassRecord {
      id:         self.id,
      student_id: self.student_id,
      session_id: self.session_id,
      class_id:   self.class_id,
      promotion:  decode_promotion(&self.promotion)?,
      remark:     self.remark,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn promotion_strings_match_schema_check() {
    assert_eq!(encode_promotion(PromotionStatus::Promoted), "PROMOTED");
    assert_eq!(encode_promotion(PromotionStatus::Repeated), "REPEATED");
    assert_eq!(encode_promotion(PromotionStatus::NotSet), "NOT_SET");
    assert_eq!(decode_promotion("NOT_SET").unwrap(), PromotionStatus::NotSet);
    assert!(matches!(decode_promotion("GRADUATED"), Err(Error::UnknownPromotion(_))));
  }

  #[test]
  fn bad_timestamp_is_reported() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
