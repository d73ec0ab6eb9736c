//! Immutable question bank: `subject -> language -> grade -> questions`.
//!
//! Built once at startup from the embedded TOML content plus any extra entries
//! from the app config. Entries are validated on the way in: a question whose
//! `answer` is not literally one of its `options` is dropped and logged.

use std::collections::HashMap;

use tracing::{info, instrument, warn};

use crate::config::QuestionCfg;
use crate::domain::{Grade, Language, QuizQuestion, Subject};

type RawBank = HashMap<String, HashMap<String, HashMap<String, Vec<QuizQuestion>>>>;

#[derive(Debug, thiserror::Error)]
pub enum BankError {
  #[error("question bank is not valid TOML: {0}")]
  Parse(#[from] toml::de::Error),
}

#[derive(Debug, PartialEq, Eq)]
enum Rejection {
  AnswerNotInOptions,
  TooFewOptions,
  EmptyPrompt,
}

fn check(q: &QuizQuestion) -> Result<(), Rejection> {
  if q.question.trim().is_empty() {
    return Err(Rejection::EmptyPrompt);
  }
  if q.options.len() < 2 {
    return Err(Rejection::TooFewOptions);
  }
  if q.answer_index().is_none() {
    return Err(Rejection::AnswerNotInOptions);
  }
  Ok(())
}

#[derive(Debug, Default)]
pub struct QuestionBank {
  entries: HashMap<(Subject, Language, Grade), Vec<QuizQuestion>>,
  rejected: usize,
}

impl QuestionBank {
  /// Parse a bank in the nested TOML layout (`[math.en]` tables keyed by grade).
  #[instrument(level = "info", skip_all, fields(bytes = text.len()))]
  pub fn from_toml(text: &str) -> Result<Self, BankError> {
    let raw: RawBank = toml::from_str(text)?;
    let mut bank = QuestionBank::default();
    for (subject, by_lang) in raw {
      for (lang, by_grade) in by_lang {
        for (grade, questions) in by_grade {
          for q in questions {
            bank.insert(&subject, &lang, &grade, q);
          }
        }
      }
    }
    info!(target: "quiz", questions = bank.len(), rejected = bank.rejected, "Question bank loaded");
    Ok(bank)
  }

  /// Append config-supplied questions. Same validation as the built-in content.
  pub fn with_extra(mut self, extra: &[QuestionCfg]) -> Self {
    for e in extra {
      let q = QuizQuestion { question: e.question.clone(), options: e.options.clone(), answer: e.answer.clone() };
      self.insert(&e.subject, &e.language, &e.grade, q);
    }
    if !extra.is_empty() {
      info!(target: "quiz", extra = extra.len(), questions = self.len(), rejected = self.rejected, "Merged extra questions from config");
    }
    self
  }

  fn insert(&mut self, subject: &str, lang: &str, grade: &str, q: QuizQuestion) {
    let key = match (Subject::parse(subject), Language::parse(lang), Grade::parse(grade)) {
      (Some(s), Some(l), Some(g)) => (s, l, g),
      _ => {
        warn!(target: "quiz", %subject, %lang, %grade, question = %q.question, "Skipping question: unknown subject/language/grade");
        self.rejected += 1;
        return;
      }
    };
    if let Err(why) = check(&q) {
      warn!(target: "quiz", %subject, %lang, %grade, question = %q.question, reason = ?why, "Skipping invalid question");
      self.rejected += 1;
      return;
    }
    self.entries.entry(key).or_default().push(q);
  }

  /// Questions for the requested language, falling back to English for the
  /// same subject and grade. Empty when neither exists.
  pub fn questions(&self, subject: Subject, lang: Language, grade: Grade) -> &[QuizQuestion] {
    self.entries
      .get(&(subject, lang, grade))
      .or_else(|| self.entries.get(&(subject, Language::En, grade)))
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }

  pub fn len(&self) -> usize {
    self.entries.values().map(Vec::len).sum()
  }

  pub fn rejected(&self) -> usize { self.rejected }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::BUILTIN_QUESTION_BANK;

  fn g(n: u8) -> Grade { Grade::new(n).unwrap() }

  #[test]
  fn builtin_bank_loads_clean() {
    let bank = QuestionBank::from_toml(BUILTIN_QUESTION_BANK).unwrap();
    assert_eq!(bank.rejected(), 0);
    assert_eq!(bank.len(), 316);
    for s in Subject::ALL {
      for grade in Grade::all() {
        assert_eq!(bank.questions(s, Language::En, grade).len(), 4, "{s:?} grade {grade}");
      }
    }
  }

  #[test]
  fn missing_language_falls_back_to_english() {
    let bank = QuestionBank::from_toml(BUILTIN_QUESTION_BANK).unwrap();
    // Odia technology content only exists for grades 6 and 7.
    let od = bank.questions(Subject::Technology, Language::Od, g(9));
    let en = bank.questions(Subject::Technology, Language::En, g(9));
    assert_eq!(od, en);
    let od7 = bank.questions(Subject::Technology, Language::Od, g(7));
    assert_ne!(od7, bank.questions(Subject::Technology, Language::En, g(7)));
  }

  #[test]
  fn answers_not_among_options_are_rejected() {
    let bank = QuestionBank::from_toml(
      r#"
        [science.en]
        "6" = [
          { question = "Q1", options = ["A", "B", "C", "D"], answer = "A" },
          { question = "Q2", options = ["A", "B", "C", "D"], answer = "E" },
          { question = "Q3", options = ["A"], answer = "A" },
        ]
        [history.en]
        "6" = [ { question = "Q4", options = ["A", "B"], answer = "A" } ]
      "#,
    )
    .unwrap();
    assert_eq!(bank.len(), 1);
    assert_eq!(bank.rejected(), 3);
  }

  #[test]
  fn absent_everything_yields_empty_slice() {
    let bank = QuestionBank::from_toml("").unwrap();
    assert!(bank.questions(Subject::Math, Language::Hi, g(12)).is_empty());
  }

  #[test]
  fn extra_questions_are_appended() {
    let extra = vec![QuestionCfg {
      subject: "engineering".into(),
      language: "hi".into(),
      grade: "6".into(),
      question: "Lever?".into(),
      options: vec!["Simple machine".into(), "Engine".into()],
      answer: "Simple machine".into(),
    }];
    let bank = QuestionBank::from_toml("").unwrap().with_extra(&extra);
    assert_eq!(bank.questions(Subject::Engineering, Language::Hi, g(6)).len(), 1);
  }
}
