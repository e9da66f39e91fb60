//! `campus` — command-line client for the Campus records server.
//!
//! # Usage
//!
//! ```
//! campus --url http://localhost:8080 sessions create 2025/2026
//! campus --config ~/.config/campus/config.toml promote --from 1 --to 2
//! ```

mod client;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use campus_core::{
  promotion::SkipReason,
  school::{ClassId, SessionId, StudentId},
  student::PromotionStatus,
};
use clap::{Parser, Subcommand};
use client::{ActionReply, ApiClient, ApiConfig};
use serde::Deserialize;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "campus", about = "Command-line client for the Campus records server")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the campus server (default: http://localhost:8080).
  #[arg(long, env = "CAMPUS_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Academic sessions.
  #[command(subcommand)]
  Sessions(SessionCommand),

  /// Promote every PROMOTED student from one session into another.
  Promote {
    #[arg(long = "from", value_name = "SESSION_ID")]
    last: SessionId,
    #[arg(long = "to", value_name = "SESSION_ID")]
    new:  SessionId,
  },

  /// Student enrollment.
  #[command(subcommand)]
  Students(StudentCommand),

  /// Per-session class records.
  #[command(subcommand)]
  Records(RecordCommand),
}

#[derive(Subcommand, Debug)]
enum SessionCommand {
  /// List sessions, oldest first.
  List {
    /// Include soft-deleted sessions.
    #[arg(long)]
    all: bool,
  },
  /// Create a session and seed its terms, grades and classes.
  Create { name: String },
  /// Show the current session.
  Current,
  /// Show a session's terms, grades and classes.
  Show { id: SessionId },
  /// Soft-delete a session.
  Delete { id: SessionId },
}

#[derive(Subcommand, Debug)]
enum StudentCommand {
  /// List students, optionally restricted to one session.
  List {
    #[arg(long, value_name = "SESSION_ID")]
    session: Option<SessionId>,
  },
  /// Enroll a student into a class.
  Enroll {
    first_name: String,
    last_name:  String,
    #[arg(long, value_name = "CLASS_ID")]
    class:      ClassId,
    /// Preferred class for the branch-grade transition, e.g. "SSS1 B".
    #[arg(long)]
    prefer:     Option<String>,
  },
  /// Set or clear a student's preferred class.
  Prefer {
    id:    StudentId,
    /// Omit to clear the preference.
    class: Option<String>,
  },
}

#[derive(Subcommand, Debug)]
enum RecordCommand {
  /// List class records for a session.
  List { session: SessionId },
  /// Record a student's end-of-session outcome.
  Set {
    #[arg(long)]
    student: StudentId,
    #[arg(long)]
    session: SessionId,
    #[arg(long)]
    class:   ClassId,
    /// promoted, repeated or not-set.
    #[arg(long, value_parser = parse_status)]
    status:  PromotionStatus,
    #[arg(long)]
    remark:  Option<String>,
  },
}

fn parse_status(raw: &str) -> Result<PromotionStatus> {
  raw
    .trim()
    .replace('-', "_")
    .to_ascii_uppercase()
    .parse()
    .map_err(|_| anyhow!("unknown promotion status {raw:?}"))
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

fn api_config(url: Option<String>, file_cfg: ConfigFile) -> ApiConfig {
  // CLI flags override config file, which overrides defaults.
  ApiConfig {
    base_url: url
      .or_else(|| (!file_cfg.url.is_empty()).then_some(file_cfg.url))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  let client = ApiClient::new(api_config(args.url, file_cfg))?;
  run(&client, args.command).await
}

async fn run(client: &ApiClient, command: Command) -> Result<()> {
  match command {
    Command::Sessions(cmd) => run_sessions(client, cmd).await,
    Command::Promote { last, new } => {
      let reply = client.promote(last, new).await?;
      print_action(&reply);
      Ok(())
    }
    Command::Students(cmd) => run_students(client, cmd).await,
    Command::Records(cmd) => run_records(client, cmd).await,
  }
}

async fn run_sessions(client: &ApiClient, cmd: SessionCommand) -> Result<()> {
  match cmd {
    SessionCommand::List { all } => {
      for s in client.list_sessions(all).await? {
        let flag = match (s.is_current, s.is_deleted) {
          (true, _) => " (current)",
          (_, true) => " (deleted)",
          _ => "",
        };
        println!("{:>4}  {}{flag}", s.id, s.name);
      }
    }
    SessionCommand::Create { name } => {
      let reply = client.create_session(&name).await?;
      print_action(&reply);
    }
    SessionCommand::Current => {
      let s = client.current_session().await?;
      println!("{:>4}  {}", s.id, s.name);
    }
    SessionCommand::Show { id } => {
      let tree = client.session_tree(id).await?;
      println!("{} ({} classes)", tree.session.name, tree.class_count());
      for term in &tree.terms {
        println!("  term  {}", term.name);
      }
      for g in &tree.grades {
        let classes: Vec<String> =
          g.classes.iter().map(|c| format!("{}#{}", c.name, c.id)).collect();
        println!("  grade {:<6} {}", g.grade.name, classes.join("  "));
      }
    }
    SessionCommand::Delete { id } => {
      let s = client.delete_session(id).await?;
      println!("deleted session {} ({})", s.id, s.name);
    }
  }
  Ok(())
}

async fn run_students(client: &ApiClient, cmd: StudentCommand) -> Result<()> {
  match cmd {
    StudentCommand::List { session } => {
      for s in client.list_students(session).await? {
        println!(
          "{:>5}  {} {}  class={} session={}{}",
          s.id,
          s.first_name,
          s.last_name,
          s.class_id,
          s.session_id,
          s.preferred_class
            .map(|p| format!(" prefers={p}"))
            .unwrap_or_default()
        );
      }
    }
    StudentCommand::Enroll { first_name, last_name, class, prefer } => {
      let s = client
        .enroll(&first_name, &last_name, class, prefer.as_deref())
        .await?;
      println!("enrolled student {} in class {}", s.id, s.class_id);
    }
    StudentCommand::Prefer { id, class } => {
      let s = client.set_preferred_class(id, class.as_deref()).await?;
      match s.preferred_class {
        Some(p) => println!("student {} prefers {p}", s.id),
        None => println!("student {} has no preference", s.id),
      }
    }
  }
  Ok(())
}

async fn run_records(client: &ApiClient, cmd: RecordCommand) -> Result<()> {
  match cmd {
    RecordCommand::List { session } => {
      for r in client.list_class_records(session).await? {
        println!(
          "{:>5}  student={} class={} {}{}",
          r.id,
          r.student_id,
          r.class_id,
          r.promotion,
          r.remark.map(|m| format!("  {m}")).unwrap_or_default()
        );
      }
    }
    RecordCommand::Set { student, session, class, status, remark } => {
      let r = client
        .record_outcome(student, session, class, status, remark.as_deref())
        .await?;
      println!("student {} marked {} in session {}", r.student_id, r.promotion, r.session_id);
    }
  }
  Ok(())
}

fn print_action(reply: &ActionReply) {
  if let Some(message) = &reply.message {
    println!("{message}");
  }
  if let Some(session) = &reply.session {
    println!("session {} ({}) is now current", session.id, session.name);
  }
  if let Some(updated) = &reply.updated_students {
    println!("{} student(s) moved", updated.len());
  }
  for skip in reply.skipped.iter().flatten() {
    let why = match &skip.reason {
      SkipReason::NoSuccessor => "no next class".to_string(),
      SkipReason::UnresolvedDestination { destination } => {
        format!("{destination} does not exist")
      }
    };
    println!("  skipped student {} in {}: {why}", skip.student_id, skip.class_name);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_parsing_is_forgiving() {
    assert_eq!(parse_status("promoted").unwrap(), PromotionStatus::Promoted);
    assert_eq!(parse_status(" Repeated ").unwrap(), PromotionStatus::Repeated);
    assert_eq!(parse_status("not-set").unwrap(), PromotionStatus::NotSet);
    assert!(parse_status("graduated").is_err());
  }

  #[test]
  fn url_precedence() {
    let file = || ConfigFile { url: "http://file:1".into() };
    assert_eq!(
      api_config(Some("http://flag:2".into()), file()).base_url,
      "http://flag:2"
    );
    assert_eq!(api_config(None, file()).base_url, "http://file:1");
    assert_eq!(
      api_config(None, ConfigFile::default()).base_url,
      "http://localhost:8080"
    );
  }

  #[test]
  fn config_file_parses() {
    let cfg: ConfigFile = toml::from_str(r#"url = "http://school:8080""#).unwrap();
    assert_eq!(cfg.url, "http://school:8080");
  }

  #[test]
  fn cli_parses_promote() {
    let args = Args::try_parse_from(["campus", "promote", "--from", "1", "--to", "2"]).unwrap();
    assert!(matches!(args.command, Command::Promote { last: 1, new: 2 }));
  }
}
