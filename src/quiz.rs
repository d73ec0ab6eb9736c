//! Subject quiz state machine.
//!
//! `Answering -> Revealed -> (Answering | Complete)`, with `NoQuestions` as the
//! terminal state for an empty question list. One `apply` call per action; the
//! countdown is driven by `Tick` so the caller owns the clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::QuizSettings;
use crate::domain::{Language, QuizQuestion};
use crate::games::Feedback;
use crate::i18n::messages;
use crate::util::round_percent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum QuizPhase {
  NoQuestions,
  Answering { selected: Option<usize>, time_left: u32 },
  Revealed { selected: Option<usize>, correct: bool },
  Complete,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuizAction {
  Select { option: usize },
  Submit,
  Tick { seconds: u32 },
  Next,
  TryAgain,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QuizError {
  #[error("no questions are available for this quiz")]
  NoQuestions,
  #[error("the current question is no longer open for answers")]
  NotAnswering,
  #[error("select an option before submitting")]
  NothingSelected,
  #[error("option {0} does not exist")]
  NoSuchOption(usize),
  #[error("the answer has not been revealed yet")]
  NotRevealed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuizSummary {
  pub score: u32,
  pub max_score: u32,
  pub correct_count: u32,
  pub total: u32,
  pub percent: u32,
  pub points_earned: u32,
  pub level_up: bool,
  pub text: String,
}

/// Question as shown to the player. `answer` stays hidden while answering.
#[derive(Clone, Debug, Serialize)]
pub struct QuestionView<'a> {
  pub question: &'a str,
  pub options: &'a [String],
  #[serde(skip_serializing_if = "Option::is_none")]
  pub answer: Option<&'a str>,
}

#[derive(Clone, Debug, Serialize)]
pub struct QuizView<'a> {
  pub index: usize,
  pub total: usize,
  pub score: u32,
  pub history: &'a [bool],
  #[serde(flatten)]
  pub phase: QuizPhase,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub current: Option<QuestionView<'a>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub summary: Option<QuizSummary>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<[&'static str; 2]>,
}

#[derive(Clone, Debug)]
pub struct QuizSession {
  questions: Vec<QuizQuestion>,
  index: usize,
  score: u32,
  history: Vec<bool>,
  answers: Vec<Option<String>>,
  phase: QuizPhase,
  settings: QuizSettings,
  lang: Language,
  /// Start of the current attempt; `TryAgain` resets it with everything else.
  started_at: DateTime<Utc>,
}

impl QuizSession {
  pub fn new(questions: Vec<QuizQuestion>, settings: QuizSettings, lang: Language) -> Self {
    let phase = if questions.is_empty() {
      QuizPhase::NoQuestions
    } else {
      QuizPhase::Answering { selected: None, time_left: settings.seconds_per_question }
    };
    Self {
      questions,
      index: 0,
      score: 0,
      history: Vec::new(),
      answers: Vec::new(),
      phase,
      settings,
      lang,
      started_at: Utc::now(),
    }
  }

  pub fn phase(&self) -> QuizPhase { self.phase }
  pub fn score(&self) -> u32 { self.score }
  pub fn len(&self) -> usize { self.questions.len() }

  pub fn started_at(&self) -> DateTime<Utc> { self.started_at }

  /// Selected option text per answered question; `None` means unanswered.
  pub fn answers(&self) -> &[Option<String>] { &self.answers }

  pub fn is_complete(&self) -> bool {
    self.phase == QuizPhase::Complete
  }

  pub fn max_score(&self) -> u32 {
    self.len() as u32 * self.settings.points_per_question
  }

  pub fn apply(&mut self, action: QuizAction) -> Result<Option<Feedback>, QuizError> {
    if self.phase == QuizPhase::NoQuestions {
      return match action {
        QuizAction::Tick { .. } | QuizAction::TryAgain => Ok(None),
        _ => Err(QuizError::NoQuestions),
      };
    }
    match action {
      QuizAction::Select { option } => {
        let QuizPhase::Answering { selected, .. } = &mut self.phase else {
          return Err(QuizError::NotAnswering);
        };
        if option >= self.questions[self.index].options.len() {
          return Err(QuizError::NoSuchOption(option));
        }
        *selected = Some(option);
        Ok(None)
      }
      QuizAction::Submit => match self.phase {
        QuizPhase::Answering { selected: Some(choice), .. } => Ok(Some(self.reveal(Some(choice)))),
        QuizPhase::Answering { selected: None, .. } => Err(QuizError::NothingSelected),
        _ => Err(QuizError::NotAnswering),
      },
      QuizAction::Tick { seconds } => {
        let QuizPhase::Answering { selected, time_left } = &mut self.phase else {
          return Ok(None);
        };
        *time_left = time_left.saturating_sub(seconds);
        if *time_left > 0 {
          return Ok(None);
        }
        let selected = *selected;
        debug!(target: "quiz", index = self.index, answered = selected.is_some(), "Question timed out");
        Ok(Some(self.reveal(selected)))
      }
      QuizAction::Next => {
        if !matches!(self.phase, QuizPhase::Revealed { .. }) {
          return Err(QuizError::NotRevealed);
        }
        if self.index + 1 < self.questions.len() {
          self.index += 1;
          self.phase = QuizPhase::Answering { selected: None, time_left: self.settings.seconds_per_question };
        } else {
          self.phase = QuizPhase::Complete;
          debug!(target: "quiz", score = self.score, total = self.questions.len(), "Quiz complete");
        }
        Ok(None)
      }
      QuizAction::TryAgain => {
        let questions = std::mem::take(&mut self.questions);
        *self = Self::new(questions, self.settings, self.lang);
        Ok(None)
      }
    }
  }

  fn reveal(&mut self, selected: Option<usize>) -> Feedback {
    let q = &self.questions[self.index];
    let chosen = selected.and_then(|i| q.options.get(i)).cloned();
    let correct = chosen.as_deref() == Some(q.answer.as_str());
    self.history.push(correct);
    self.answers.push(chosen);
    self.phase = QuizPhase::Revealed { selected, correct };

    let t = messages(self.lang);
    if correct {
      let points = self.settings.points_per_question;
      self.score += points;
      Feedback::hit(points, format!("{} +{} {}", t.correct, points, t.points_earned))
    } else {
      Feedback::miss(t.incorrect.to_string())
    }
  }

  pub fn summary(&self) -> Option<QuizSummary> {
    if !self.is_complete() {
      return None;
    }
    let t = messages(self.lang);
    let percent = round_percent(self.score, self.max_score());
    let level_up = percent >= self.settings.level_up_percent;
    let text = if level_up { format!("{} {}", t.quiz_complete, t.new_level) } else { t.quiz_complete.to_string() };
    Some(QuizSummary {
      score: self.score,
      max_score: self.max_score(),
      correct_count: self.history.iter().filter(|c| **c).count() as u32,
      total: self.len() as u32,
      percent,
      points_earned: self.score * 2,
      level_up,
      text,
    })
  }

  pub fn view(&self) -> QuizView<'_> {
    let current = match self.phase {
      QuizPhase::Answering { .. } | QuizPhase::Revealed { .. } => self.questions.get(self.index).map(|q| QuestionView {
        question: &q.question,
        options: &q.options,
        answer: matches!(self.phase, QuizPhase::Revealed { .. }).then_some(q.answer.as_str()),
      }),
      _ => None,
    };
    let message = (self.phase == QuizPhase::NoQuestions).then(|| {
      let t = messages(self.lang);
      [t.no_questions, t.no_questions_desc]
    });
    QuizView {
      index: self.index,
      total: self.len(),
      score: self.score,
      history: &self.history,
      phase: self.phase(),
      current,
      summary: self.summary(),
      message,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn q(answer: &str) -> QuizQuestion {
    QuizQuestion {
      question: format!("pick {answer}"),
      options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
      answer: answer.into(),
    }
  }

  fn quiz(answers: &[&str]) -> QuizSession {
    QuizSession::new(answers.iter().map(|a| q(a)).collect(), QuizSettings::default(), Language::En)
  }

  fn answer(s: &mut QuizSession, option: usize) -> Feedback {
    s.apply(QuizAction::Select { option }).unwrap();
    let f = s.apply(QuizAction::Submit).unwrap().unwrap();
    s.apply(QuizAction::Next).unwrap();
    f
  }

  #[test]
  fn empty_bank_is_terminal_no_questions() {
    let mut s = quiz(&[]);
    assert_eq!(s.phase(), QuizPhase::NoQuestions);
    assert_eq!(s.apply(QuizAction::Submit), Err(QuizError::NoQuestions));
    assert_eq!(s.apply(QuizAction::Tick { seconds: 30 }), Ok(None));
    let v = serde_json::to_value(s.view()).unwrap();
    assert_eq!(v["phase"], "no_questions");
    assert_eq!(v["message"][0], "No Questions Found");
    assert!(s.summary().is_none());
  }

  #[test]
  fn scoring_and_summary() {
    let mut s = quiz(&["a", "b", "c"]);
    assert!(answer(&mut s, 0).correct);
    let f = answer(&mut s, 0);
    assert_eq!((f.correct, f.points, f.text.as_str()), (false, 0, "Incorrect"));
    let f = answer(&mut s, 2);
    assert_eq!(f.text, "Correct! +10 points earned!");
    assert!(s.is_complete());
    let sum = s.summary().unwrap();
    assert_eq!((sum.score, sum.max_score, sum.percent, sum.points_earned), (20, 30, 67, 40));
    assert!(!sum.level_up);
    assert_eq!(s.answers(), &[Some("a".into()), Some("a".into()), Some("c".into())]);
  }

  #[test]
  fn eighty_percent_unlocks_level_acknowledgment() {
    let mut s = quiz(&["a", "a", "a", "a", "b"]);
    for _ in 0..5 {
      answer(&mut s, 0);
    }
    let sum = s.summary().unwrap();
    assert_eq!(sum.percent, 80);
    assert!(sum.level_up);
    assert_eq!(sum.text, "Quiz Complete! New Level Unlocked!");
  }

  #[test]
  fn submit_requires_a_selection_and_locks_after_reveal() {
    let mut s = quiz(&["a", "b"]);
    assert_eq!(s.apply(QuizAction::Submit), Err(QuizError::NothingSelected));
    assert_eq!(s.apply(QuizAction::Select { option: 4 }), Err(QuizError::NoSuchOption(4)));
    assert_eq!(s.apply(QuizAction::Next), Err(QuizError::NotRevealed));
    s.apply(QuizAction::Select { option: 1 }).unwrap();
    s.apply(QuizAction::Select { option: 0 }).unwrap();
    s.apply(QuizAction::Submit).unwrap();
    assert_eq!(s.phase(), QuizPhase::Revealed { selected: Some(0), correct: true });
    assert_eq!(s.apply(QuizAction::Select { option: 1 }), Err(QuizError::NotAnswering));
    assert_eq!(s.apply(QuizAction::Submit), Err(QuizError::NotAnswering));
  }

  #[test]
  fn countdown_expiry_submits_unanswered_or_current_choice() {
    let mut s = quiz(&["a", "b"]);
    assert_eq!(s.apply(QuizAction::Tick { seconds: 29 }), Ok(None));
    let f = s.apply(QuizAction::Tick { seconds: 1 }).unwrap().unwrap();
    assert!(!f.correct);
    assert_eq!(s.phase(), QuizPhase::Revealed { selected: None, correct: false });
    // Timer is paused while revealed.
    assert_eq!(s.apply(QuizAction::Tick { seconds: 10 }), Ok(None));
    s.apply(QuizAction::Next).unwrap();
    assert_eq!(s.phase(), QuizPhase::Answering { selected: None, time_left: 30 });

    s.apply(QuizAction::Select { option: 1 }).unwrap();
    let f = s.apply(QuizAction::Tick { seconds: 45 }).unwrap().unwrap();
    assert!(f.correct);
    assert_eq!(s.answers(), &[None, Some("b".into())]);
    assert_eq!(s.score(), 10);
  }

  #[test]
  fn answer_hidden_until_revealed() {
    let mut s = quiz(&["c"]);
    let v = serde_json::to_value(s.view()).unwrap();
    assert!(v["current"].get("answer").is_none());
    assert_eq!(v["phase"], "answering");
    s.apply(QuizAction::Select { option: 2 }).unwrap();
    s.apply(QuizAction::Submit).unwrap();
    let v = serde_json::to_value(s.view()).unwrap();
    assert_eq!(v["current"]["answer"], "c");
    assert_eq!(v["history"], serde_json::json!([true]));
  }

  #[test]
  fn try_again_resets_everything() {
    let mut s = quiz(&["a"]);
    answer(&mut s, 0);
    assert!(s.is_complete());
    s.apply(QuizAction::TryAgain).unwrap();
    assert_eq!(s.phase(), QuizPhase::Answering { selected: None, time_left: 30 });
    assert_eq!((s.score(), s.answers().len(), s.len()), (0, 0, 1));
  }

  #[test]
  fn percent_stays_in_range() {
    for correct in 0..=7 {
      let mut s = quiz(&["a"; 7]);
      for i in 0..7 {
        answer(&mut s, if i < correct { 0 } else { 1 });
      }
      let p = s.summary().unwrap().percent;
      assert!(p <= 100);
      assert_eq!(p, round_percent(correct as u32 * 10, 70));
    }
  }
}
