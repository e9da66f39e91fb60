//! [`SqliteStore`] — the SQLite implementation of [`SchoolStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use campus_core::{
  school::{Class, Grade, GradeTree, NewSession, Session, SessionId, StudentId, Term},
  store::SchoolStore,
  student::{
    ClassRecord, NewClassRecord, NewStudent, Placement, PromotedRecord, PromotionStatus,
    Student,
  },
};

use crate::{
  encode::{
    RECORD_COLUMNS, RawClassRecord, RawSession, SESSION_COLUMNS, STUDENT_COLUMNS, encode_dt,
    encode_promotion, student_from_row,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Campus school store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a single-row session query.
  async fn query_session(
    &self,
    where_clause: &'static str,
    param: Option<rusqlite::types::Value>,
  ) -> Result<Option<Session>> {
    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE {where_clause}");
        let params: Vec<rusqlite::types::Value> = param.into_iter().collect();
        Ok(
          conn
            .query_row(&sql, rusqlite::params_from_iter(params), RawSession::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }
}

/// Fetch one student on an open connection or transaction.
fn fetch_student(
  conn: &rusqlite::Connection,
  id: StudentId,
) -> rusqlite::Result<Option<Student>> {
  conn
    .query_row(
      &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?1"),
      rusqlite::params![id],
      student_from_row,
    )
    .optional()
}

// ─── SchoolStore impl ────────────────────────────────────────────────────────

impl SchoolStore for SqliteStore {
  type Error = Error;

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(&self, input: NewSession) -> Result<Option<Session>> {
    let created_at = Utc::now();
    let at_str     = encode_dt(created_at);
    let name       = input.name.clone();

    let id: Option<SessionId> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let taken = tx
          .query_row(
            "SELECT 1 FROM sessions WHERE name = ?1",
            rusqlite::params![input.name],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(None);
        }

        tx.execute("UPDATE sessions SET is_current = 0 WHERE is_current = 1", [])?;
        match tx.execute(
          "INSERT INTO sessions (name, is_current, is_deleted, created_at)
           VALUES (?1, 1, 0, ?2)",
          rusqlite::params![input.name, at_str],
        ) {
          Ok(_) => {}
          // Another writer on the same file took the name first.
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
          {
            return Ok(None);
          }
          Err(e) => return Err(e.into()),
        }
        let session_id = tx.last_insert_rowid();

        {
          let mut term_stmt =
            tx.prepare("INSERT INTO terms (name, session_id) VALUES (?1, ?2)")?;
          for term in &input.terms {
            term_stmt.execute(rusqlite::params![term, session_id])?;
          }

          let mut grade_stmt =
            tx.prepare("INSERT INTO grades (name, session_id) VALUES (?1, ?2)")?;
          let mut class_stmt =
            tx.prepare("INSERT INTO classes (name, grade_id) VALUES (?1, ?2)")?;
          for grade in &input.grades {
            grade_stmt.execute(rusqlite::params![grade.name, session_id])?;
            let grade_id = tx.last_insert_rowid();
            for class in &grade.classes {
              class_stmt.execute(rusqlite::params![class, grade_id])?;
            }
          }
        }

        tx.commit()?;
        Ok(Some(session_id))
      })
      .await?;

    Ok(id.map(|id| Session { id, name, is_current: true, is_deleted: false, created_at }))
  }

  async fn find_session_by_name(&self, name: &str) -> Result<Option<Session>> {
    self
      .query_session("name = ?1", Some(name.to_owned().into()))
      .await
  }

  async fn get_session(&self, id: SessionId) -> Result<Option<Session>> {
    self.query_session("id = ?1", Some(id.into())).await
  }

  async fn current_session(&self) -> Result<Option<Session>> {
    self
      .query_session("is_current = 1 AND is_deleted = 0", None)
      .await
  }

  async fn list_sessions(&self, include_deleted: bool) -> Result<Vec<Session>> {
    let raws: Vec<RawSession> = self
      .conn
      .call(move |conn| {
        let sql = if include_deleted {
          format!("SELECT {SESSION_COLUMNS} FROM sessions ORDER BY id")
        } else {
          format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE is_deleted = 0 ORDER BY id")
        };
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawSession::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSession::into_session).collect()
  }

  async fn soft_delete_session(&self, id: SessionId) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE sessions SET is_deleted = 1 WHERE id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn list_terms(&self, session_id: SessionId) -> Result<Vec<Term>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(
            "SELECT id, name, session_id FROM terms WHERE session_id = ?1 ORDER BY id",
          )?;
          let rows = stmt
            .query_map(rusqlite::params![session_id], |row| {
              Ok(Term {
                id:         row.get(0)?,
                name:       row.get(1)?,
                session_id: row.get(2)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn grade_tree(&self, session_id: SessionId) -> Result<Vec<GradeTree>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut grade_stmt = conn.prepare(
            "SELECT id, name, session_id FROM grades WHERE session_id = ?1 ORDER BY id",
          )?;
          let mut tree = grade_stmt
            .query_map(rusqlite::params![session_id], |row| {
              Ok(GradeTree {
                grade:   Grade {
                  id:         row.get(0)?,
                  name:       row.get(1)?,
                  session_id: row.get(2)?,
                },
                classes: Vec::new(),
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

          let mut class_stmt = conn.prepare(
            "SELECT c.id, c.name, c.grade_id
             FROM classes c
             JOIN grades g ON g.id = c.grade_id
             WHERE g.session_id = ?1
             ORDER BY c.id",
          )?;
          let classes = class_stmt
            .query_map(rusqlite::params![session_id], |row| {
              Ok(Class {
                id:       row.get(0)?,
                name:     row.get(1)?,
                grade_id: row.get(2)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

          for class in classes {
            if let Some(node) = tree.iter_mut().find(|g| g.grade.id == class.grade_id) {
              node.classes.push(class);
            }
          }
          Ok(tree)
        })
        .await?,
    )
  }

  // ── Students ──────────────────────────────────────────────────────────────

  async fn create_student(&self, input: NewStudent) -> Result<Option<Student>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let owner: Option<(i64, i64)> = conn
            .query_row(
              "SELECT c.grade_id, g.session_id
               FROM classes c
               JOIN grades g ON g.id = c.grade_id
               WHERE c.id = ?1",
              rusqlite::params![input.class_id],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

          let Some((grade_id, session_id)) = owner else {
            return Ok(None);
          };

          conn.execute(
            "INSERT INTO students
               (first_name, last_name, class_id, grade_id, session_id, preferred_class)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
              input.first_name,
              input.last_name,
              input.class_id,
              grade_id,
              session_id,
              input.preferred_class,
            ],
          )?;

          Ok(Some(Student {
            id: conn.last_insert_rowid(),
            first_name: input.first_name,
            last_name: input.last_name,
            class_id: input.class_id,
            grade_id,
            session_id,
            preferred_class: input.preferred_class,
          }))
        })
        .await?,
    )
  }

  async fn get_student(&self, id: StudentId) -> Result<Option<Student>> {
    Ok(self.conn.call(move |conn| Ok(fetch_student(conn, id)?)).await?)
  }

  async fn list_students(&self, session_id: Option<SessionId>) -> Result<Vec<Student>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let rows = if let Some(sid) = session_id {
            let mut stmt = conn.prepare(&format!(
              "SELECT {STUDENT_COLUMNS} FROM students WHERE session_id = ?1 ORDER BY id"
            ))?;
            stmt
              .query_map(rusqlite::params![sid], student_from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          } else {
            let mut stmt =
              conn.prepare(&format!("SELECT {STUDENT_COLUMNS} FROM students ORDER BY id"))?;
            stmt
              .query_map([], student_from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          };
          Ok(rows)
        })
        .await?,
    )
  }

  async fn set_preferred_class(
    &self,
    id: StudentId,
    preferred_class: Option<String>,
  ) -> Result<Option<Student>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let changed = conn.execute(
            "UPDATE students SET preferred_class = ?1 WHERE id = ?2",
            rusqlite::params![preferred_class, id],
          )?;
          if changed == 0 {
            return Ok(None);
          }
          Ok(fetch_student(conn, id)?)
        })
        .await?,
    )
  }

  async fn apply_placements(&self, placements: &[Placement]) -> Result<Vec<Student>> {
    let placements = placements.to_vec();

    let applied: std::result::Result<Vec<Student>, StudentId> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut updated = Vec::with_capacity(placements.len());

        for p in &placements {
          let consistent = tx
            .query_row(
              "SELECT 1
               FROM classes c
               JOIN grades g ON g.id = c.grade_id
               WHERE c.id = ?1 AND c.grade_id = ?2 AND g.session_id = ?3",
              rusqlite::params![p.class_id, p.grade_id, p.session_id],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
          if !consistent {
            // Dropping `tx` rolls back the placements applied so far.
            return Ok(Err(p.student_id));
          }

          let changed = tx.execute(
            "UPDATE students SET class_id = ?1, grade_id = ?2, session_id = ?3
             WHERE id = ?4",
            rusqlite::params![p.class_id, p.grade_id, p.session_id, p.student_id],
          )?;
          match fetch_student(&tx, p.student_id)? {
            Some(student) if changed > 0 => updated.push(student),
            _ => return Ok(Err(p.student_id)),
          }
        }

        tx.commit()?;
        Ok(Ok(updated))
      })
      .await?;

    applied.map_err(Error::InconsistentPlacement)
  }

  // ── Class records ─────────────────────────────────────────────────────────

  async fn upsert_class_record(&self, input: NewClassRecord) -> Result<ClassRecord> {
    let promotion = encode_promotion(input.promotion);

    let raw: RawClassRecord = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO class_records (student_id, session_id, class_id, promotion, remark)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (student_id, session_id) DO UPDATE SET
             class_id  = excluded.class_id,
             promotion = excluded.promotion,
             remark    = excluded.remark",
          rusqlite::params![
            input.student_id,
            input.session_id,
            input.class_id,
            promotion,
            input.remark,
          ],
        )?;
        Ok(conn.query_row(
          &format!(
            "SELECT {RECORD_COLUMNS} FROM class_records
             WHERE student_id = ?1 AND session_id = ?2"
          ),
          rusqlite::params![input.student_id, input.session_id],
          RawClassRecord::from_row,
        )?)
      })
      .await?;

    raw.into_record()
  }

  async fn list_class_records(&self, session_id: SessionId) -> Result<Vec<ClassRecord>> {
    let raws: Vec<RawClassRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RECORD_COLUMNS} FROM class_records WHERE session_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![session_id], RawClassRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawClassRecord::into_record).collect()
  }

  async fn promoted_records(&self, session_id: SessionId) -> Result<Vec<PromotedRecord>> {
    let promoted = encode_promotion(PromotionStatus::Promoted);

    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(
            "SELECT r.id, r.student_id, c.name, s.preferred_class
             FROM class_records r
             JOIN classes  c ON c.id = r.class_id
             JOIN students s ON s.id = r.student_id
             WHERE r.session_id = ?1 AND r.promotion = ?2
             ORDER BY r.id",
          )?;
          let rows = stmt
            .query_map(rusqlite::params![session_id, promoted], |row| {
              Ok(PromotedRecord {
                record_id:       row.get(0)?,
                student_id:      row.get(1)?,
                class_name:      row.get(2)?,
                preferred_class: row.get(3)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }
}
