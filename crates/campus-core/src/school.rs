//! School structure: sessions and the terms, grades, and classes seeded into
//! each one.
//!
//! Structural rows are written once, when their session is created. Only a
//! session's `is_current` and `is_deleted` flags change afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type SessionId = i64;
pub type TermId = i64;
pub type GradeId = i64;
pub type ClassId = i64;
pub type StudentId = i64;
pub type ClassRecordId = i64;

// ─── Entities ────────────────────────────────────────────────────────────────

/// An academic year, e.g. "2025/2026". At most one session is current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub id:         SessionId,
  pub name:       String,
  pub is_current: bool,
  pub is_deleted: bool,
  pub created_at: DateTime<Utc>,
}

/// A sub-period of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
  pub id:         TermId,
  pub name:       String,
  pub session_id: SessionId,
}

/// A year group scoped to one session. Grades are never shared between
/// sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
  pub id:         GradeId,
  pub name:       String,
  pub session_id: SessionId,
}

/// A section within a grade, e.g. "JSS1 A".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
  pub id:       ClassId,
  pub name:     String,
  pub grade_id: GradeId,
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// A grade together with its classes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeTree {
  pub grade:   Grade,
  pub classes: Vec<Class>,
}

/// Everything seeded for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTree {
  pub session: Session,
  pub terms:   Vec<Term>,
  pub grades:  Vec<GradeTree>,
}

impl SessionTree {
  pub fn class_count(&self) -> usize {
    self.grades.iter().map(|g| g.classes.len()).sum()
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// A grade to seed, with the names of its classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGrade {
  pub name:    String,
  pub classes: Vec<String>,
}

/// Input to [`crate::store::SchoolStore::create_session`]: the full seed for a
/// new session. The store writes it in a single transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
  pub name:   String,
  pub terms:  Vec<String>,
  pub grades: Vec<NewGrade>,
}
