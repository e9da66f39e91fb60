//! The school template: the fixed structure seeded into every new session and
//! the promotion chain between its grades.
//!
//! A template is plain configuration. Both engines take it by reference, so an
//! alternate school layout can be substituted by constructing a different
//! value (or loading one from the server's config file).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  school::{NewGrade, NewSession},
};

/// Trim, upper-case, and collapse inner whitespace: `" jss1   a "` becomes
/// `"JSS1 A"`.
pub fn normalize_class_name(name: &str) -> String {
  name
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
    .to_ascii_uppercase()
}

/// A grade and the section suffixes of its classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeTemplate {
  pub name:     String,
  pub sections: Vec<String>,
}

impl GradeTemplate {
  fn new(name: &str, sections: &[&str]) -> Self {
    Self {
      name:     name.to_owned(),
      sections: sections.iter().map(|s| (*s).to_owned()).collect(),
    }
  }

  /// Class names for this grade, e.g. `["JSS1 A", "JSS1 B"]`.
  pub fn class_names(&self) -> Vec<String> {
    self
      .sections
      .iter()
      .map(|section| format!("{} {}", self.name, section))
      .collect()
  }
}

/// One link of the promotion chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionStep {
  pub from: String,
  pub to:   String,
}

/// The grade where the linear chain stops and students pick a track instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRule {
  pub grade:         String,
  /// Destination used when a student has not stated a preference.
  pub default_class: String,
}

/// Structure of the school, seeded into each new session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolTemplate {
  pub terms:      Vec<String>,
  /// Ordered; order only affects seeding and log output.
  pub grades:     Vec<GradeTemplate>,
  pub promotions: Vec<PromotionStep>,
  pub branch:     Option<BranchRule>,
}

impl Default for SchoolTemplate {
  fn default() -> Self {
    let junior = ["A", "B"];
    let senior = ["A", "B", "C"];
    let step = |from: &str, to: &str| PromotionStep {
      from: from.to_owned(),
      to:   to.to_owned(),
    };

    Self {
      terms:      vec![
        "First Term".to_owned(),
        "Second Term".to_owned(),
        "Third Term".to_owned(),
      ],
      grades:     vec![
        GradeTemplate::new("JSS1", &junior),
        GradeTemplate::new("JSS2", &junior),
        GradeTemplate::new("JSS3", &junior),
        GradeTemplate::new("SSS1", &senior),
        GradeTemplate::new("SSS2", &senior),
        GradeTemplate::new("SSS3", &senior),
      ],
      promotions: vec![
        step("JSS1", "JSS2"),
        step("JSS2", "JSS3"),
        step("SSS1", "SSS2"),
        step("SSS2", "SSS3"),
      ],
      branch:     Some(BranchRule {
        grade:         "JSS3".to_owned(),
        default_class: "SSS1 A".to_owned(),
      }),
    }
  }
}

impl SchoolTemplate {
  /// Check internal consistency. Called by the engines before use.
  pub fn validate(&self) -> Result<()> {
    let invalid = |msg: String| Err(Error::InvalidTemplate(msg));

    if self.terms.is_empty() {
      return invalid("at least one term is required".into());
    }
    if self.grades.is_empty() {
      return invalid("at least one grade is required".into());
    }

    let mut seen = HashSet::new();
    for grade in &self.grades {
      let name = normalize_class_name(&grade.name);
      if name.is_empty() {
        return invalid("grade names must not be empty".into());
      }
      if !seen.insert(name) {
        return invalid(format!("grade {:?} is listed twice", grade.name));
      }
      if grade.sections.iter().all(|s| s.trim().is_empty()) {
        return invalid(format!("grade {:?} has no sections", grade.name));
      }
    }

    for step in &self.promotions {
      for end in [&step.from, &step.to] {
        if !seen.contains(&normalize_class_name(end)) {
          return invalid(format!("promotion step names unknown grade {end:?}"));
        }
      }
    }

    if let Some(branch) = &self.branch
      && !seen.contains(&normalize_class_name(&branch.grade))
    {
      return invalid(format!("branch grade {:?} is unknown", branch.grade));
    }

    Ok(())
  }

  /// The seed handed to the store for a session called `name`.
  pub fn session_plan(&self, name: &str) -> NewSession {
    NewSession {
      name:   name.to_owned(),
      terms:  self.terms.clone(),
      grades: self
        .grades
        .iter()
        .map(|g| NewGrade { name: g.name.clone(), classes: g.class_names() })
        .collect(),
    }
  }

  /// Resolve the grade a class belongs to, returning it with the (normalized)
  /// section suffix. The longest matching grade name wins.
  pub fn grade_of(&self, class_name: &str) -> Option<(&GradeTemplate, String)> {
    let class_name = normalize_class_name(class_name);
    self
      .grades
      .iter()
      .filter_map(|g| {
        let grade_name = normalize_class_name(&g.name);
        class_name
          .strip_prefix(&grade_name)
          .map(|rest| (g, grade_name.len(), rest.trim().to_owned()))
      })
      .max_by_key(|(_, len, _)| *len)
      .map(|(g, _, section)| (g, section))
  }

  /// The next grade in the chain, if the grade has one.
  pub fn next_grade(&self, grade: &str) -> Option<&str> {
    let grade = normalize_class_name(grade);
    self
      .promotions
      .iter()
      .find(|step| normalize_class_name(&step.from) == grade)
      .map(|step| step.to.as_str())
  }

  /// Destination class name for a student leaving `class_name`, keeping the
  /// section: `"JSS1 A"` maps to `"JSS2 A"`. Returns `None` when the template
  /// has no automatic successor for the class's grade.
  pub fn successor(&self, class_name: &str) -> Option<String> {
    let (grade, section) = self.grade_of(class_name)?;
    let next = self.next_grade(&grade.name)?;
    let dest = if section.is_empty() {
      next.to_owned()
    } else {
      format!("{next} {section}")
    };
    Some(normalize_class_name(&dest))
  }

  /// Whether `class_name` lies in the branch grade.
  pub fn is_branch_class(&self, class_name: &str) -> bool {
    self.branch.as_ref().is_some_and(|b| {
      normalize_class_name(class_name).starts_with(&normalize_class_name(&b.grade))
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_trims_and_uppercases() {
    assert_eq!(normalize_class_name("  jss1   a "), "JSS1 A");
    assert_eq!(normalize_class_name("SSS2 C"), "SSS2 C");
    assert_eq!(normalize_class_name("   "), "");
  }

  #[test]
  fn default_template_is_valid() {
    SchoolTemplate::default().validate().unwrap();
  }

  #[test]
  fn default_plan_has_expected_shape() {
    let plan = SchoolTemplate::default().session_plan("2025/2026");
    assert_eq!(plan.name, "2025/2026");
    assert_eq!(plan.terms, ["First Term", "Second Term", "Third Term"]);
    assert_eq!(plan.grades.len(), 6);

    let classes: usize = plan.grades.iter().map(|g| g.classes.len()).sum();
    assert_eq!(classes, 15);

    let sss1 = plan.grades.iter().find(|g| g.name == "SSS1").unwrap();
    assert_eq!(sss1.classes, ["SSS1 A", "SSS1 B", "SSS1 C"]);
    let jss3 = plan.grades.iter().find(|g| g.name == "JSS3").unwrap();
    assert_eq!(jss3.classes, ["JSS3 A", "JSS3 B"]);
  }

  #[test]
  fn successor_keeps_section() {
    let t = SchoolTemplate::default();
    assert_eq!(t.successor("JSS1 A").as_deref(), Some("JSS2 A"));
    assert_eq!(t.successor("jss2 b").as_deref(), Some("JSS3 B"));
    assert_eq!(t.successor("SSS2 C").as_deref(), Some("SSS3 C"));
  }

  #[test]
  fn terminal_grades_have_no_successor() {
    let t = SchoolTemplate::default();
    assert_eq!(t.successor("JSS3 A"), None);
    assert_eq!(t.successor("SSS3 B"), None);
    assert_eq!(t.successor("PRIMARY 6"), None);
  }

  #[test]
  fn branch_class_detection() {
    let t = SchoolTemplate::default();
    assert!(t.is_branch_class("JSS3 B"));
    assert!(t.is_branch_class(" jss3 a"));
    assert!(!t.is_branch_class("JSS2 B"));
    assert!(!t.is_branch_class("SSS3 A"));
  }

  #[test]
  fn longest_grade_prefix_wins() {
    let t = SchoolTemplate {
      grades: vec![
        GradeTemplate::new("Y1", &["A"]),
        GradeTemplate::new("Y10", &["A"]),
      ],
      promotions: vec![],
      branch: None,
      ..SchoolTemplate::default()
    };
    let (grade, section) = t.grade_of("Y10 A").unwrap();
    assert_eq!(grade.name, "Y10");
    assert_eq!(section, "A");
  }

  #[test]
  fn validate_rejects_unknown_promotion_target() {
    let mut t = SchoolTemplate::default();
    t.promotions.push(PromotionStep { from: "SSS3".into(), to: "UNI1".into() });
    assert!(matches!(t.validate(), Err(Error::InvalidTemplate(_))));
  }

  #[test]
  fn validate_rejects_duplicate_grade() {
    let mut t = SchoolTemplate::default();
    t.grades.push(GradeTemplate::new("jss1", &["A"]));
    assert!(matches!(t.validate(), Err(Error::InvalidTemplate(_))));
  }

  #[test]
  fn validate_rejects_missing_terms() {
    let t = SchoolTemplate { terms: vec![], ..SchoolTemplate::default() };
    assert!(matches!(t.validate(), Err(Error::InvalidTemplate(_))));
  }

  #[test]
  fn template_deserialises_with_defaults() {
    let t: SchoolTemplate =
      serde_json::from_str(r#"{"terms": ["Autumn", "Spring"]}"#).unwrap();
    assert_eq!(t.terms, ["Autumn", "Spring"]);
    assert_eq!(t.grades.len(), 6);
    assert!(t.branch.is_some());
  }
}
