//! SQL schema for the Campus SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS sessions (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL UNIQUE,
    is_current  INTEGER NOT NULL DEFAULT 0,
    is_deleted  INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT    NOT NULL     -- RFC 3339 UTC
);

-- At most one current session.
CREATE UNIQUE INDEX IF NOT EXISTS sessions_current_idx
    ON sessions(is_current) WHERE is_current = 1;

CREATE TABLE IF NOT EXISTS terms (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL,
    session_id  INTEGER NOT NULL REFERENCES sessions(id)
);

CREATE TABLE IF NOT EXISTS grades (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL,
    session_id  INTEGER NOT NULL REFERENCES sessions(id),
    UNIQUE (session_id, name)
);

CREATE TABLE IF NOT EXISTS classes (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL,
    grade_id    INTEGER NOT NULL REFERENCES grades(id)
);

CREATE TABLE IF NOT EXISTS students (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name       TEXT    NOT NULL,
    last_name        TEXT    NOT NULL,
    class_id         INTEGER NOT NULL REFERENCES classes(id),
    grade_id         INTEGER NOT NULL REFERENCES grades(id),
    session_id       INTEGER NOT NULL REFERENCES sessions(id),
    preferred_class  TEXT
);

-- One frozen enrollment snapshot per student per session.
CREATE TABLE IF NOT EXISTS class_records (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id  INTEGER NOT NULL REFERENCES students(id),
    session_id  INTEGER NOT NULL REFERENCES sessions(id),
    class_id    INTEGER NOT NULL REFERENCES classes(id),
    promotion   TEXT    NOT NULL DEFAULT 'NOT_SET',  -- PROMOTED | REPEATED | NOT_SET
    remark      TEXT,
    UNIQUE (student_id, session_id),
    CHECK  (promotion IN ('PROMOTED', 'REPEATED', 'NOT_SET'))
);

CREATE INDEX IF NOT EXISTS terms_session_idx     ON terms(session_id);
CREATE INDEX IF NOT EXISTS classes_grade_idx     ON classes(grade_id);
CREATE INDEX IF NOT EXISTS students_session_idx  ON students(session_id);
CREATE INDEX IF NOT EXISTS records_session_idx   ON class_records(session_id, promotion);

PRAGMA user_version = 1;
";
