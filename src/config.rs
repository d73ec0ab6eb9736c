//! Loading service configuration (game tunables + optional extra questions) from TOML.
//!
//! See `AppConfig` for the expected schema. Every section is optional; missing
//! values fall back to the defaults the games are specified with.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub quiz: QuizSettings,
  #[serde(default)]
  pub drill: DrillSettings,
  #[serde(default)]
  pub sessions: SessionSettings,
  #[serde(default)]
  pub questions: Vec<QuestionCfg>,
}

/// Subject quiz tunables.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QuizSettings {
  pub seconds_per_question: u32,
  pub points_per_question: u32,
  /// Percentage at or above which the "new level" acknowledgment is shown.
  pub level_up_percent: u32,
}

impl Default for QuizSettings {
  fn default() -> Self {
    Self { seconds_per_question: 30, points_per_question: 10, level_up_percent: 80 }
  }
}

/// Arithmetic drill tunables.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DrillSettings {
  pub duration_secs: u32,
  /// Final scores above this raise the cosmetic high-score flag.
  pub high_score: u32,
}

impl Default for DrillSettings {
  fn default() -> Self {
    Self { duration_secs: 60, high_score: 500 }
  }
}

/// Play-session store housekeeping.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionSettings {
  /// Sessions with no action for this long are dropped by the sweep.
  pub idle_timeout_secs: u64,
  pub sweep_interval_secs: u64,
}

impl Default for SessionSettings {
  fn default() -> Self {
    Self { idle_timeout_secs: 1800, sweep_interval_secs: 60 }
  }
}

/// Extra question bank entry accepted in TOML configuration.
/// Keys are kept as raw strings here and checked when the bank is built.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  pub subject: String,
  pub language: String,
  pub grade: String,
  pub question: String,
  pub options: Vec<String>,
  pub answer: String,
}

/// Attempt to load `AppConfig` from APP_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("APP_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_app_config(&s) {
      Ok(cfg) => {
        info!(target: "stem_quest", %path, extra_questions = cfg.questions.len(), "Loaded app config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "stem_quest", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "stem_quest", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

pub fn parse_app_config(s: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(s)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_file_yields_specified_defaults() {
    let cfg = parse_app_config("").unwrap();
    assert_eq!(cfg.quiz, QuizSettings { seconds_per_question: 30, points_per_question: 10, level_up_percent: 80 });
    assert_eq!(cfg.drill.duration_secs, 60);
    assert_eq!(cfg.sessions, SessionSettings { idle_timeout_secs: 1800, sweep_interval_secs: 60 });
    assert!(cfg.questions.is_empty());
  }

  #[test]
  fn partial_sections_and_extra_questions() {
    let cfg = parse_app_config(
      r#"
        [quiz]
        seconds_per_question = 45

        [[questions]]
        subject = "science"
        language = "hi"
        grade = "6"
        question = "H2O?"
        options = ["Water", "Salt", "Sand", "Air"]
        answer = "Water"
      "#,
    )
    .unwrap();
    assert_eq!(cfg.quiz.seconds_per_question, 45);
    assert_eq!(cfg.quiz.points_per_question, 10);
    assert_eq!(cfg.questions.len(), 1);
    assert_eq!(cfg.questions[0].answer, "Water");
  }
}
