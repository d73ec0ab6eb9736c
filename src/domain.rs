//! Domain models shared across the service: languages, grades, subjects, roles,
//! questions, and the records exchanged with the hosted backend.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User-facing language. Anything outside `en`/`hi`/`od` falls back to English.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
  #[default]
  En,
  Hi,
  Od,
}

impl Language {
  pub fn code(self) -> &'static str {
    match self {
      Language::En => "en",
      Language::Hi => "hi",
      Language::Od => "od",
    }
  }

  pub fn parse(code: &str) -> Option<Self> {
    match code.trim() {
      "en" => Some(Language::En),
      "hi" => Some(Language::Hi),
      "od" => Some(Language::Od),
      _ => None,
    }
  }

  /// Lenient parse used at every user-facing boundary.
  pub fn parse_or_default(code: Option<&str>) -> Self {
    code.and_then(Self::parse).unwrap_or_default()
  }
}

/// School grade, "6" through "12". Serialized as the string literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Grade(u8);

impl Grade {
  pub const MIN: u8 = 6;
  pub const MAX: u8 = 12;

  pub fn new(n: u8) -> Option<Self> {
    (Self::MIN..=Self::MAX).contains(&n).then_some(Grade(n))
  }

  pub fn parse(s: &str) -> Option<Self> {
    s.trim().parse::<u8>().ok().and_then(Self::new)
  }

  pub fn number(self) -> u8 { self.0 }

  #[cfg(test)]
  pub fn all() -> impl Iterator<Item = Grade> {
    (Self::MIN..=Self::MAX).map(Grade)
  }
}

impl Default for Grade {
  fn default() -> Self { Grade(Self::MIN) }
}

impl fmt::Display for Grade {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl Serialize for Grade {
  fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for Grade {
  fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(d)?;
    Grade::parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("grade must be \"6\"..\"12\", got {raw:?}")))
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
  #[serde(alias = "mathematics")]
  Math,
  Science,
  Technology,
  Engineering,
}

impl Subject {
  pub const ALL: [Subject; 4] = [Subject::Math, Subject::Science, Subject::Technology, Subject::Engineering];

  pub fn key(self) -> &'static str {
    match self {
      Subject::Math => "math",
      Subject::Science => "science",
      Subject::Technology => "technology",
      Subject::Engineering => "engineering",
    }
  }

  /// Table value used by the hosted backend (`student_progress.subject` etc.).
  pub fn backend_key(self) -> &'static str {
    match self {
      Subject::Math => "mathematics",
      other => other.key(),
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s.trim() {
      "math" | "mathematics" => Some(Subject::Math),
      "science" => Some(Subject::Science),
      "technology" => Some(Subject::Technology),
      "engineering" => Some(Subject::Engineering),
      _ => None,
    }
  }

  pub fn title(self) -> &'static str {
    match self {
      Subject::Math => "Mathematics",
      Subject::Science => "Science",
      Subject::Technology => "Technology",
      Subject::Engineering => "Engineering",
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  Student,
  Teacher,
}

/// A single multiple-choice question. `answer` holds the literal text of the
/// correct option, not its index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
  pub question: String,
  pub options: Vec<String>,
  pub answer: String,
}

impl QuizQuestion {
  pub fn answer_index(&self) -> Option<usize> {
    self.options.iter().position(|o| *o == self.answer)
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
  pub id: String,
  pub email: String,
  pub name: String,
  pub role: Role,
  #[serde(default)] pub grade: Option<Grade>,
  #[serde(default)] pub created_at: Option<DateTime<Utc>>,
  #[serde(default)] pub updated_at: Option<DateTime<Utc>>,
}

/// Profile fields collected by the sign-up form.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewProfile {
  pub name: String,
  pub role: Role,
  #[serde(default)] pub grade: Option<Grade>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthUser {
  pub id: String,
  #[serde(default)] pub email: Option<String>,
  #[serde(default)] pub created_at: Option<DateTime<Utc>>,
}

/// Authenticated session as issued by the backend.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthSession {
  pub access_token: String,
  pub user: AuthUser,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressRecord {
  #[serde(default)] pub id: Option<String>,
  pub user_id: String,
  pub subject: Subject,
  #[serde(default)] pub activities_completed: u32,
  #[serde(default)] pub total_activities: u32,
  #[serde(default)] pub points: u32,
  #[serde(default)] pub badges: Vec<String>,
  #[serde(default = "first_level")] pub current_level: u32,
}

fn first_level() -> u32 { 1 }

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProgressUpdate {
  #[serde(default, skip_serializing_if = "Option::is_none")] pub activities_completed: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub total_activities: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub points: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub badges: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub current_level: Option<u32>,
}

/// Quiz result as submitted. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewQuizResult {
  pub user_id: String,
  pub activity_id: String,
  pub score: u32,
  pub max_score: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub time_taken_seconds: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub answers: Option<Vec<Option<String>>>,
  pub points_earned: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizResult {
  pub id: String,
  #[serde(flatten)] pub result: NewQuizResult,
  pub completed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewClass {
  pub teacher_id: String,
  pub class_name: String,
  pub grade: Grade,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub subject: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassRecord {
  pub id: String,
  pub teacher_id: String,
  pub class_name: String,
  pub grade: Grade,
  #[serde(default)] pub subject: Option<String>,
  #[serde(default)] pub description: Option<String>,
  #[serde(default)] pub student_count: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassStudent {
  pub student_id: String,
  #[serde(default)] pub joined_at: Option<DateTime<Utc>>,
  #[serde(default)] pub users: Option<StudentSummary>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StudentSummary {
  pub id: String,
  pub name: String,
  pub email: String,
  #[serde(default)] pub grade: Option<Grade>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType { Quiz, Game, Challenge, Experiment }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty { Easy, Medium, Hard }

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Activity {
  pub id: String,
  pub subject: Subject,
  pub title: String,
  #[serde(default)] pub description: Option<String>,
  pub grade_level: Grade,
  pub activity_type: ActivityType,
  pub difficulty: Difficulty,
  #[serde(default)] pub points_reward: u32,
  #[serde(default)] pub estimated_time_minutes: Option<u32>,
  #[serde(default)] pub content: serde_json::Value,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementType { Badge, Trophy, Certificate, Streak }

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Achievement {
  pub id: String,
  pub user_id: String,
  pub achievement_type: AchievementType,
  pub achievement_name: String,
  #[serde(default)] pub achievement_icon: Option<String>,
  #[serde(default)] pub subject: Option<String>,
  pub earned_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_language_codes_fall_back_to_english() {
    assert_eq!(Language::parse_or_default(Some("hi")), Language::Hi);
    assert_eq!(Language::parse_or_default(Some("fr")), Language::En);
    assert_eq!(Language::parse_or_default(None), Language::En);
  }

  #[test]
  fn grades_are_string_literals_six_to_twelve() {
    assert!(Grade::parse("5").is_none());
    assert!(Grade::parse("13").is_none());
    let g: Grade = serde_json::from_str("\"9\"").unwrap();
    assert_eq!(g.number(), 9);
    assert_eq!(serde_json::to_string(&g).unwrap(), "\"9\"");
    assert!(serde_json::from_str::<Grade>("\"twelve\"").is_err());
  }

  #[test]
  fn backend_subject_spelling_is_accepted() {
    let s: Subject = serde_json::from_str("\"mathematics\"").unwrap();
    assert_eq!(s, Subject::Math);
    assert_eq!(Subject::Math.backend_key(), "mathematics");
  }
}
