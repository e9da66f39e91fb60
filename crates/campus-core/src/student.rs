//! Students and their per-session class records.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::school::{ClassId, ClassRecordId, GradeId, SessionId, StudentId};

/// A student's live enrollment. `class_id`, `grade_id` and `session_id` always
/// agree: the class belongs to the grade and the grade to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
  pub id:              StudentId,
  pub first_name:      String,
  pub last_name:       String,
  pub class_id:        ClassId,
  pub grade_id:        GradeId,
  pub session_id:      SessionId,
  /// Normalized class name the student wants at the junior/senior boundary.
  pub preferred_class: Option<String>,
}

/// Input to [`crate::store::SchoolStore::create_student`]. Grade and session
/// are derived from the class by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
  pub first_name:      String,
  pub last_name:       String,
  pub class_id:        ClassId,
  #[serde(default)]
  pub preferred_class: Option<String>,
}

/// End-of-session outcome recorded for a student.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionStatus {
  Promoted,
  Repeated,
  #[default]
  NotSet,
}

/// A frozen snapshot of a student's enrollment during one session.
///
/// The Promotion Engine reads these rather than the live [`Student`] so that
/// decisions are taken against what the student held that session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
  pub id:         ClassRecordId,
  pub student_id: StudentId,
  pub session_id: SessionId,
  pub class_id:   ClassId,
  pub promotion:  PromotionStatus,
  pub remark:     Option<String>,
}

/// Input to [`crate::store::SchoolStore::upsert_class_record`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewClassRecord {
  pub student_id: StudentId,
  pub session_id: SessionId,
  pub class_id:   ClassId,
  #[serde(default)]
  pub promotion:  PromotionStatus,
  #[serde(default)]
  pub remark:     Option<String>,
}

/// A PROMOTED class record joined with what the engine needs to place it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotedRecord {
  pub record_id:       ClassRecordId,
  pub student_id:      StudentId,
  pub class_name:      String,
  pub preferred_class: Option<String>,
}

/// A computed destination for one student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
  pub student_id: StudentId,
  pub class_id:   ClassId,
  pub grade_id:   GradeId,
  pub session_id: SessionId,
}
