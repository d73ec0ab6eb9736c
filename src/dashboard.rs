//! Role-based dashboard views.

use serde::Serialize;

use crate::bank::QuestionBank;
use crate::domain::{Grade, Language, Role, Subject};
use crate::games::GameKind;
use crate::seeds::{ClassRow, StudentRow, CLASS_ROWS, STUDENT_ROWS};
use crate::util::round_percent;

#[derive(Debug, Serialize)]
pub struct SubjectCard {
  pub subject: Subject,
  pub title: &'static str,
  pub question_count: usize,
  /// Mini-game paired with the subject.
  pub game: GameKind,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct TeacherStats {
  pub total_students: u32,
  pub active_classes: u32,
  pub average_score: u32,
  pub completion_rate: u32,
}

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Dashboard {
  Student { grade: Grade, language: Language, subjects: Vec<SubjectCard>, games: [GameKind; 4] },
  Teacher { stats: TeacherStats, classes: &'static [ClassRow], students: &'static [StudentRow] },
}

fn game_for(subject: Subject) -> GameKind {
  match subject {
    Subject::Math => GameKind::Arithmetic,
    Subject::Science => GameKind::Matching,
    Subject::Technology => GameKind::Sequencing,
    Subject::Engineering => GameKind::Bridge,
  }
}

/// Aggregates over the illustrative rows; not derived from submitted results.
pub fn teacher_stats(classes: &[ClassRow], students: &[StudentRow]) -> TeacherStats {
  let total_students = classes.iter().map(|c| c.students).sum();
  let score_sum: u32 = classes.iter().map(|c| c.avg_score).sum();
  let completed = students.iter().filter(|s| s.status == "Completed").count() as u32;
  TeacherStats {
    total_students,
    active_classes: classes.len() as u32,
    average_score: round_percent(score_sum, classes.len() as u32 * 100),
    completion_rate: round_percent(completed, students.len() as u32),
  }
}

pub fn build(role: Role, grade: Option<Grade>, language: Language, bank: &QuestionBank) -> Dashboard {
  match role {
    Role::Student => {
      let grade = grade.unwrap_or_default();
      let subjects = Subject::ALL
        .iter()
        .map(|&subject| SubjectCard {
          subject,
          title: subject.title(),
          question_count: bank.questions(subject, language, grade).len(),
          game: game_for(subject),
        })
        .collect();
      Dashboard::Student { grade, language, subjects, games: GameKind::ALL }
    }
    Role::Teacher => {
      Dashboard::Teacher { stats: teacher_stats(&CLASS_ROWS, &STUDENT_ROWS), classes: &CLASS_ROWS, students: &STUDENT_ROWS }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::BUILTIN_QUESTION_BANK;

  #[test]
  fn teacher_aggregates_from_static_rows() {
    let stats = teacher_stats(&CLASS_ROWS, &STUDENT_ROWS);
    assert_eq!(stats, TeacherStats { total_students: 107, active_classes: 4, average_score: 88, completion_rate: 60 });
    let empty = teacher_stats(&[], &[]);
    assert_eq!(empty.average_score, 0);
  }

  #[test]
  fn student_view_defaults_to_grade_six_and_counts_questions() {
    let bank = QuestionBank::from_toml(BUILTIN_QUESTION_BANK).unwrap();
    let d = build(Role::Student, None, Language::Od, &bank);
    let v = serde_json::to_value(&d).unwrap();
    assert_eq!(v["role"], "student");
    assert_eq!(v["grade"], "6");
    assert_eq!(v["subjects"].as_array().unwrap().len(), 4);
    assert_eq!(v["subjects"][0]["subject"], "math");
    assert_eq!(v["subjects"][0]["game"], "arithmetic");
    assert_eq!(v["subjects"][0]["question_count"], 4);
  }

  #[test]
  fn teacher_view_lists_classes_and_students() {
    let bank = QuestionBank::default();
    let v = serde_json::to_value(build(Role::Teacher, None, Language::En, &bank)).unwrap();
    assert_eq!(v["classes"].as_array().unwrap().len(), 4);
    assert_eq!(v["students"][2]["status"], "In Progress");
    assert_eq!(v["stats"]["total_students"], 107);
  }
}
