//! The Promotion Engine: moves students whose previous-session class record is
//! PROMOTED into the matching class of a new session.
//!
//! Destinations follow the template's promotion chain, keeping the section
//! (`JSS1 A` to `JSS2 A`). Students in the branch grade choose a track through
//! their preferred class instead. Students whose destination cannot be
//! resolved are skipped and reported, never failing the rest of the batch.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  school::{ClassId, GradeId, GradeTree, SessionId, StudentId},
  store::SchoolStore,
  student::{Placement, PromotedRecord, Student},
  template::{SchoolTemplate, normalize_class_name},
};

// ─── Class index ─────────────────────────────────────────────────────────────

/// Normalized class name to `(class, grade)` for one session. Built fresh for
/// every engine run.
#[derive(Debug, Default)]
pub struct ClassIndex {
  entries: HashMap<String, (ClassId, GradeId)>,
}

impl ClassIndex {
  /// Index a session's grade tree. Two classes with the same normalized name
  /// fail with [`Error::DuplicateClassName`].
  pub fn build(tree: &[GradeTree]) -> Result<Self> {
    let mut entries = HashMap::new();
    for grade in tree {
      for class in &grade.classes {
        let key = normalize_class_name(&class.name);
        if entries.insert(key.clone(), (class.id, grade.grade.id)).is_some() {
          return Err(Error::DuplicateClassName(key));
        }
      }
    }
    Ok(Self { entries })
  }

  pub fn resolve(&self, class_name: &str) -> Option<(ClassId, GradeId)> {
    self.entries.get(&normalize_class_name(class_name)).copied()
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

// ─── Planning ────────────────────────────────────────────────────────────────

/// Why a promoted student was left where they are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
  /// The template has no successor for the student's grade (e.g. a final-year
  /// student).
  NoSuccessor,
  /// The destination class does not exist in the new session.
  UnresolvedDestination { destination: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedStudent {
  pub student_id: StudentId,
  pub class_name: String,
  #[serde(flatten)]
  pub reason:     SkipReason,
}

/// Placements and skips computed from a set of promoted records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromotionPlan {
  pub placements: Vec<Placement>,
  pub skipped:    Vec<SkippedStudent>,
}

/// Result of a promotion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromotionOutcome {
  pub updated: Vec<Student>,
  pub skipped: Vec<SkippedStudent>,
}

/// Resolve the destination class for one record. `Err` carries the skip
/// reason.
fn destination(
  template: &SchoolTemplate,
  index: &ClassIndex,
  record: &PromotedRecord,
) -> Result<(ClassId, GradeId), SkipReason> {
  let successor = template.successor(&record.class_name);

  if let Some(dest) = &successor
    && let Some(ids) = index.resolve(dest)
  {
    return Ok(ids);
  }

  if successor.is_none()
    && let Some(branch) = template.branch.as_ref()
    && template.is_branch_class(&record.class_name)
  {
    let dest = record
      .preferred_class
      .as_deref()
      .map(normalize_class_name)
      .filter(|name| !name.is_empty())
      .unwrap_or_else(|| normalize_class_name(&branch.default_class));
    return index
      .resolve(&dest)
      .ok_or(SkipReason::UnresolvedDestination { destination: dest });
  }

  match successor {
    Some(destination) => Err(SkipReason::UnresolvedDestination { destination }),
    None => Err(SkipReason::NoSuccessor),
  }
}

/// Compute placements for `records` into the session indexed by `index`.
///
/// Pure; records are planned independently of one another.
pub fn plan_promotions(
  template: &SchoolTemplate,
  index: &ClassIndex,
  records: &[PromotedRecord],
  new_session_id: SessionId,
) -> PromotionPlan {
  let mut plan = PromotionPlan::default();

  for record in records {
    match destination(template, index, record) {
      Ok((class_id, grade_id)) => {
        debug!(
          student_id = record.student_id,
          from = %record.class_name,
          class_id,
          grade_id,
          "planned promotion"
        );
        plan.placements.push(Placement {
          student_id: record.student_id,
          class_id,
          grade_id,
          session_id: new_session_id,
        });
      }
      Err(reason) => {
        warn!(
          student_id = record.student_id,
          class = %record.class_name,
          ?reason,
          "skipping promoted student"
        );
        plan.skipped.push(SkippedStudent {
          student_id: record.student_id,
          class_name: record.class_name.clone(),
          reason,
        });
      }
    }
  }

  plan
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Promote every student whose record in `last_session_id` is PROMOTED into
/// `new_session_id`.
///
/// Fails with [`Error::SessionNotFound`] if the new session is missing,
/// soft-deleted or without classes, and with [`Error::NoPromotedStudents`] if
/// there is nothing to promote. All placements are applied in one store
/// transaction.
pub async fn promote_and_transfer_students<S: SchoolStore>(
  store: &S,
  template: &SchoolTemplate,
  last_session_id: SessionId,
  new_session_id: SessionId,
) -> Result<PromotionOutcome> {
  template.validate()?;

  // A soft-deleted session cannot receive students.
  if !store
    .get_session(new_session_id)
    .await
    .map_err(Error::store)?
    .is_some_and(|s| !s.is_deleted)
  {
    return Err(Error::SessionNotFound(new_session_id));
  }

  let tree = store.grade_tree(new_session_id).await.map_err(Error::store)?;
  let index = ClassIndex::build(&tree)?;
  if index.is_empty() {
    return Err(Error::SessionNotFound(new_session_id));
  }

  let records = store
    .promoted_records(last_session_id)
    .await
    .map_err(Error::store)?;
  if records.is_empty() {
    return Err(Error::NoPromotedStudents(last_session_id));
  }

  let plan = plan_promotions(template, &index, &records, new_session_id);
  let updated = if plan.placements.is_empty() {
    Vec::new()
  } else {
    store
      .apply_placements(&plan.placements)
      .await
      .map_err(Error::store)?
  };

  info!(
    last_session_id,
    new_session_id,
    promoted = records.len(),
    updated = updated.len(),
    skipped = plan.skipped.len(),
    "promotion finished"
  );

  Ok(PromotionOutcome { updated, skipped: plan.skipped })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    school::{Class, Grade},
    template::GradeTemplate,
  };

  const NEW_SESSION: SessionId = 2;

  /// A grade tree for every grade in `template`, ids assigned sequentially.
  fn tree_for(template: &SchoolTemplate) -> Vec<GradeTree> {
    let mut next_class = 100;
    template
      .grades
      .iter()
      .zip(10..)
      .map(|(g, grade_id)| GradeTree {
        grade:   Grade { id: grade_id, name: g.name.clone(), session_id: NEW_SESSION },
        classes: g
          .class_names()
          .into_iter()
          .map(|name| {
            next_class += 1;
            Class { id: next_class, name, grade_id }
          })
          .collect(),
      })
      .collect()
  }

  fn record(student_id: StudentId, class_name: &str) -> PromotedRecord {
    PromotedRecord {
      record_id: student_id,
      student_id,
      class_name: class_name.into(),
      preferred_class: None,
    }
  }

  fn ids_of(tree: &[GradeTree], class_name: &str) -> (ClassId, GradeId) {
    tree
      .iter()
      .flat_map(|g| g.classes.iter())
      .find(|c| c.name == class_name)
      .map(|c| (c.id, c.grade_id))
      .unwrap()
  }

  #[test]
  fn index_resolves_case_insensitively() {
    let tree = tree_for(&SchoolTemplate::default());
    let index = ClassIndex::build(&tree).unwrap();
    assert_eq!(index.len(), 15);
    assert_eq!(index.resolve(" jss2 a "), Some(ids_of(&tree, "JSS2 A")));
    assert_eq!(index.resolve("JSS4 A"), None);
  }

  #[test]
  fn index_rejects_colliding_names() {
    let mut tree = tree_for(&SchoolTemplate::default());
    let grade_id = tree[1].grade.id;
    tree[1].classes.push(Class { id: 999, name: "jss1 a".into(), grade_id });
    let err = ClassIndex::build(&tree).unwrap_err();
    assert!(matches!(err, Error::DuplicateClassName(ref n) if n == "JSS1 A"));
  }

  #[test]
  fn linear_chain_keeps_section() {
    let template = SchoolTemplate::default();
    let tree = tree_for(&template);
    let index = ClassIndex::build(&tree).unwrap();

    let plan = plan_promotions(
      &template,
      &index,
      &[record(1, "JSS1 A"), record(2, "SSS2 C")],
      NEW_SESSION,
    );

    assert!(plan.skipped.is_empty());
    let (jss2a, jss2) = ids_of(&tree, "JSS2 A");
    let (sss3c, sss3) = ids_of(&tree, "SSS3 C");
    assert_eq!(plan.placements, [
      Placement { student_id: 1, class_id: jss2a, grade_id: jss2, session_id: NEW_SESSION },
      Placement { student_id: 2, class_id: sss3c, grade_id: sss3, session_id: NEW_SESSION },
    ]);
  }

  #[test]
  fn branch_grade_defaults_to_first_senior_class() {
    let template = SchoolTemplate::default();
    let tree = tree_for(&template);
    let index = ClassIndex::build(&tree).unwrap();

    let plan = plan_promotions(&template, &index, &[record(7, "JSS3 B")], NEW_SESSION);

    let (class_id, grade_id) = ids_of(&tree, "SSS1 A");
    assert_eq!(plan.placements.len(), 1);
    assert_eq!(plan.placements[0].class_id, class_id);
    assert_eq!(plan.placements[0].grade_id, grade_id);
  }

  #[test]
  fn branch_grade_uses_preferred_class() {
    let template = SchoolTemplate::default();
    let tree = tree_for(&template);
    let index = ClassIndex::build(&tree).unwrap();

    let mut rec = record(7, "JSS3 A");
    rec.preferred_class = Some(" sss1 c".into());
    let plan = plan_promotions(&template, &index, &[rec], NEW_SESSION);

    assert_eq!(plan.placements[0].class_id, ids_of(&tree, "SSS1 C").0);
  }

  #[test]
  fn blank_preference_falls_back_to_default() {
    let template = SchoolTemplate::default();
    let tree = tree_for(&template);
    let index = ClassIndex::build(&tree).unwrap();

    let mut rec = record(7, "JSS3 A");
    rec.preferred_class = Some("   ".into());
    let plan = plan_promotions(&template, &index, &[rec], NEW_SESSION);

    assert_eq!(plan.placements[0].class_id, ids_of(&tree, "SSS1 A").0);
  }

  #[test]
  fn unknown_preference_is_skipped() {
    let template = SchoolTemplate::default();
    let index = ClassIndex::build(&tree_for(&template)).unwrap();

    let mut rec = record(7, "JSS3 A");
    rec.preferred_class = Some("SSS1 Z".into());
    let plan = plan_promotions(&template, &index, &[rec], NEW_SESSION);

    assert!(plan.placements.is_empty());
    assert_eq!(plan.skipped[0].reason, SkipReason::UnresolvedDestination {
      destination: "SSS1 Z".into(),
    });
  }

  #[test]
  fn missing_default_class_is_skipped() {
    let template = SchoolTemplate::default();
    let mut tree = tree_for(&template);
    for g in &mut tree {
      g.classes.retain(|c| c.name != "SSS1 A");
    }
    let index = ClassIndex::build(&tree).unwrap();

    let plan = plan_promotions(&template, &index, &[record(3, "JSS3 B")], NEW_SESSION);

    assert!(plan.placements.is_empty());
    assert_eq!(plan.skipped.len(), 1);
    assert_eq!(plan.skipped[0].student_id, 3);
  }

  #[test]
  fn final_grade_has_no_successor() {
    let template = SchoolTemplate::default();
    let index = ClassIndex::build(&tree_for(&template)).unwrap();

    let plan = plan_promotions(&template, &index, &[record(4, "SSS3 A")], NEW_SESSION);

    assert!(plan.placements.is_empty());
    assert_eq!(plan.skipped[0].reason, SkipReason::NoSuccessor);
  }

  #[test]
  fn one_bad_record_does_not_block_the_batch() {
    let template = SchoolTemplate::default();
    let index = ClassIndex::build(&tree_for(&template)).unwrap();

    let plan = plan_promotions(
      &template,
      &index,
      &[record(1, "JSS1 B"), record(2, "JSS9 B")],
      NEW_SESSION,
    );

    assert_eq!(plan.placements.len(), 1);
    assert_eq!(plan.placements[0].student_id, 1);
    assert_eq!(plan.skipped.len(), 1);
    assert_eq!(plan.skipped[0].student_id, 2);
  }

  #[test]
  fn alternate_template_without_branch() {
    let template = SchoolTemplate {
      terms:      vec!["Autumn".into(), "Spring".into(), "Summer".into()],
      grades:     vec![
        GradeTemplate { name: "Y7".into(), sections: vec!["RED".into(), "BLUE".into()] },
        GradeTemplate { name: "Y8".into(), sections: vec!["RED".into(), "BLUE".into()] },
      ],
      promotions: vec![crate::template::PromotionStep { from: "Y7".into(), to: "Y8".into() }],
      branch:     None,
    };
    template.validate().unwrap();
    let tree = tree_for(&template);
    let index = ClassIndex::build(&tree).unwrap();

    let plan = plan_promotions(
      &template,
      &index,
      &[record(1, "Y7 BLUE"), record(2, "Y8 RED")],
      NEW_SESSION,
    );

    assert_eq!(plan.placements[0].class_id, ids_of(&tree, "Y8 BLUE").0);
    assert_eq!(plan.skipped[0].reason, SkipReason::NoSuccessor);
  }

  #[test]
  fn skipped_student_serialises_flat() {
    let skipped = SkippedStudent {
      student_id: 9,
      class_name: "JSS3 A".into(),
      reason:     SkipReason::UnresolvedDestination { destination: "SSS1 A".into() },
    };
    let json = serde_json::to_value(&skipped).unwrap();
    assert_eq!(json["reason"], "unresolved_destination");
    assert_eq!(json["destination"], "SSS1 A");
  }
}
