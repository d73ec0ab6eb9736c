//! Play sessions: one quiz or mini-game held server-side per session id.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bank::QuestionBank;
use crate::config::AppConfig;
use crate::domain::{Grade, Language, NewQuizResult, Subject};
use crate::games::arithmetic::{ArithmeticDrill, DrillAction};
use crate::games::bridge::{BridgeAction, BridgeGame};
use crate::games::matching::{MatchAction, MatchingGame};
use crate::games::sequencing::{SequenceAction, SequencingGame};
use crate::games::{Feedback, GameError, GameKind};
use crate::quiz::{QuizAction, QuizError, QuizSession, QuizSummary, QuizView};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
  Quiz,
  Arithmetic,
  Matching,
  Sequencing,
  Bridge,
}

impl ActivityKind {
  pub fn key(self) -> &'static str {
    match self {
      ActivityKind::Quiz => "quiz",
      ActivityKind::Arithmetic => GameKind::Arithmetic.key(),
      ActivityKind::Matching => GameKind::Matching.key(),
      ActivityKind::Sequencing => GameKind::Sequencing.key(),
      ActivityKind::Bridge => GameKind::Bridge.key(),
    }
  }
}

/// What to start. `subject` is required for quizzes; `grade` defaults to "6".
#[derive(Clone, Debug, Deserialize)]
pub struct SessionRequest {
  pub activity: ActivityKind,
  #[serde(default)]
  pub subject: Option<Subject>,
  #[serde(default)]
  pub grade: Option<Grade>,
  #[serde(default)]
  pub lang: Option<String>,
  #[serde(default)]
  pub user_id: Option<String>,
  #[serde(default)]
  pub activity_id: Option<String>,
}

/// Every action any activity understands, tagged by `type`.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
  // quiz
  Select { option: usize },
  Submit,
  Next,
  TryAgain,
  // shared by the quiz and the drill
  Tick { seconds: u32 },
  // drill
  Answer { value: String },
  // matching
  Pick { card: usize },
  // sequencing
  Place { item: u32 },
  Remove { position: usize },
  Check,
  // bridge
  AddMaterial { material: String },
  RemoveMaterial { material: String },
  ResetBridge,
  Test,
  // all games
  Restart,
}

impl Action {
  pub fn name(&self) -> &'static str {
    match self {
      Action::Select { .. } => "select",
      Action::Submit => "submit",
      Action::Next => "next",
      Action::TryAgain => "try_again",
      Action::Tick { .. } => "tick",
      Action::Answer { .. } => "answer",
      Action::Pick { .. } => "pick",
      Action::Place { .. } => "place",
      Action::Remove { .. } => "remove",
      Action::Check => "check",
      Action::AddMaterial { .. } => "add_material",
      Action::RemoveMaterial { .. } => "remove_material",
      Action::ResetBridge => "reset_bridge",
      Action::Test => "test",
      Action::Restart => "restart",
    }
  }

  fn into_quiz(self) -> Option<QuizAction> {
    Some(match self {
      Action::Select { option } => QuizAction::Select { option },
      Action::Submit => QuizAction::Submit,
      Action::Next => QuizAction::Next,
      Action::TryAgain | Action::Restart => QuizAction::TryAgain,
      Action::Tick { seconds } => QuizAction::Tick { seconds },
      _ => return None,
    })
  }

  fn into_drill(self) -> Option<DrillAction> {
    Some(match self {
      Action::Answer { value } => DrillAction::Answer { value },
      Action::Tick { seconds } => DrillAction::Tick { seconds },
      Action::Restart => DrillAction::Restart,
      _ => return None,
    })
  }

  fn into_matching(self) -> Option<MatchAction> {
    Some(match self {
      Action::Pick { card } => MatchAction::Pick { card },
      Action::Restart => MatchAction::Restart,
      _ => return None,
    })
  }

  fn into_sequencing(self) -> Option<SequenceAction> {
    Some(match self {
      Action::Place { item } => SequenceAction::Place { item },
      Action::Remove { position } => SequenceAction::Remove { position },
      Action::Check => SequenceAction::Check,
      Action::Restart => SequenceAction::Restart,
      _ => return None,
    })
  }

  fn into_bridge(self) -> Option<BridgeAction> {
    Some(match self {
      Action::AddMaterial { material } => BridgeAction::AddMaterial { material },
      Action::RemoveMaterial { material } => BridgeAction::RemoveMaterial { material },
      Action::ResetBridge => BridgeAction::ResetBridge,
      Action::Test => BridgeAction::Test,
      Action::Restart => BridgeAction::Restart,
      _ => return None,
    })
  }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
  #[error("a subject is required to start a quiz")]
  MissingSubject,
  #[error("action {action:?} does not apply to a {activity} session")]
  WrongActivity { action: &'static str, activity: &'static str },
  #[error("only quiz sessions produce quiz results")]
  NotAQuiz,
  #[error("the quiz is not complete yet")]
  QuizNotComplete,
  #[error(transparent)]
  Quiz(#[from] QuizError),
  #[error(transparent)]
  Game(#[from] GameError),
}

#[derive(Clone, Debug)]
pub enum Activity {
  Quiz(QuizSession),
  Arithmetic(ArithmeticDrill),
  Matching(MatchingGame),
  Sequencing(SequencingGame),
  Bridge(BridgeGame),
}

impl Activity {
  pub fn kind(&self) -> ActivityKind {
    match self {
      Activity::Quiz(_) => ActivityKind::Quiz,
      Activity::Arithmetic(_) => ActivityKind::Arithmetic,
      Activity::Matching(_) => ActivityKind::Matching,
      Activity::Sequencing(_) => ActivityKind::Sequencing,
      Activity::Bridge(_) => ActivityKind::Bridge,
    }
  }

  pub fn is_finished(&self) -> bool {
    match self {
      Activity::Quiz(q) => q.is_complete(),
      Activity::Arithmetic(d) => d.is_over(),
      Activity::Matching(g) => g.is_complete(),
      Activity::Sequencing(g) => g.is_complete(),
      Activity::Bridge(g) => g.is_complete(),
    }
  }

  pub fn score(&self) -> u32 {
    match self {
      Activity::Quiz(q) => q.score(),
      Activity::Arithmetic(d) => d.score,
      Activity::Matching(g) => g.score,
      Activity::Sequencing(g) => g.score,
      Activity::Bridge(g) => g.score,
    }
  }
}

#[derive(Serialize)]
#[serde(tag = "activity", rename_all = "snake_case")]
pub enum ActivityView<'a> {
  Quiz(QuizView<'a>),
  Arithmetic(&'a ArithmeticDrill),
  Matching(&'a MatchingGame),
  Sequencing(&'a SequencingGame),
  Bridge(&'a BridgeGame),
}

/// Serializable snapshot of a session, safe to hand to the client.
#[derive(Serialize)]
pub struct SessionView<'a> {
  pub id: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user_id: Option<&'a str>,
  pub activity_id: &'a str,
  pub language: Language,
  pub started_at: DateTime<Utc>,
  pub finished: bool,
  pub state: ActivityView<'a>,
}

#[derive(Clone, Debug)]
pub struct Session {
  pub id: String,
  pub user_id: Option<String>,
  pub activity_id: String,
  pub language: Language,
  pub started_at: DateTime<Utc>,
  /// Last time a client acted on this session; the idle sweep reads it.
  pub last_active: DateTime<Utc>,
  pub activity: Activity,
}

impl Session {
  pub fn start(req: SessionRequest, bank: &QuestionBank, config: &AppConfig, rng: &mut impl Rng) -> Result<Self, SessionError> {
    let language = Language::parse_or_default(req.lang.as_deref());
    let grade = req.grade.unwrap_or_default();
    let (activity, default_id) = match req.activity {
      ActivityKind::Quiz => {
        let subject = req.subject.ok_or(SessionError::MissingSubject)?;
        let questions = bank.questions(subject, language, grade).to_vec();
        let quiz = QuizSession::new(questions, config.quiz, language);
        (Activity::Quiz(quiz), format!("quiz-{}-{}", subject.key(), grade))
      }
      ActivityKind::Arithmetic => {
        let drill = ArithmeticDrill::new(grade, language, config.drill, rng);
        (Activity::Arithmetic(drill), format!("game-arithmetic-{grade}"))
      }
      ActivityKind::Matching => (Activity::Matching(MatchingGame::new(language, rng)), "game-matching".to_string()),
      ActivityKind::Sequencing => (Activity::Sequencing(SequencingGame::new(language, rng)), "game-sequencing".to_string()),
      ActivityKind::Bridge => (Activity::Bridge(BridgeGame::new(language)), "game-bridge".to_string()),
    };
    let started_at = match &activity {
      Activity::Quiz(q) => q.started_at(),
      _ => Utc::now(),
    };
    Ok(Self {
      id: Uuid::new_v4().to_string(),
      user_id: req.user_id.filter(|u| !u.trim().is_empty()),
      activity_id: req.activity_id.unwrap_or(default_id),
      language,
      started_at,
      last_active: Utc::now(),
      activity,
    })
  }

  pub fn apply(&mut self, action: Action, rng: &mut impl Rng) -> Result<Option<Feedback>, SessionError> {
    let wrong = SessionError::WrongActivity { action: action.name(), activity: self.activity.kind().key() };
    match &mut self.activity {
      Activity::Quiz(q) => Ok(q.apply(action.into_quiz().ok_or(wrong)?)?),
      Activity::Arithmetic(d) => Ok(d.apply(action.into_drill().ok_or(wrong)?, rng)?),
      Activity::Matching(g) => Ok(g.apply(action.into_matching().ok_or(wrong)?, rng)?),
      Activity::Sequencing(g) => Ok(g.apply(action.into_sequencing().ok_or(wrong)?, rng)?),
      Activity::Bridge(g) => Ok(g.apply(action.into_bridge().ok_or(wrong)?, rng)?),
    }
  }

  pub fn is_idle(&self, now: DateTime<Utc>, max_idle: chrono::Duration) -> bool {
    now - self.last_active >= max_idle
  }

  pub fn view(&self) -> SessionView<'_> {
    let state = match &self.activity {
      Activity::Quiz(q) => ActivityView::Quiz(q.view()),
      Activity::Arithmetic(d) => ActivityView::Arithmetic(d),
      Activity::Matching(g) => ActivityView::Matching(g),
      Activity::Sequencing(g) => ActivityView::Sequencing(g),
      Activity::Bridge(g) => ActivityView::Bridge(g),
    };
    SessionView {
      id: &self.id,
      user_id: self.user_id.as_deref(),
      activity_id: &self.activity_id,
      language: self.language,
      started_at: self.started_at,
      finished: self.activity.is_finished(),
      state,
    }
  }

  pub fn quiz_summary(&self) -> Option<QuizSummary> {
    match &self.activity {
      Activity::Quiz(q) => q.summary(),
      _ => None,
    }
  }

  /// Result record for a completed quiz, timed from the start of the current
  /// attempt to `now`.
  pub fn quiz_result(&self, user_id: &str, now: DateTime<Utc>) -> Result<NewQuizResult, SessionError> {
    let Activity::Quiz(quiz) = &self.activity else {
      return Err(SessionError::NotAQuiz);
    };
    let summary = quiz.summary().ok_or(SessionError::QuizNotComplete)?;
    let elapsed = (now - quiz.started_at()).num_seconds().max(0);
    Ok(NewQuizResult {
      user_id: user_id.to_string(),
      activity_id: self.activity_id.clone(),
      score: summary.score,
      max_score: summary.max_score,
      time_taken_seconds: Some(u32::try_from(elapsed).unwrap_or(u32::MAX)),
      answers: Some(quiz.answers().to_vec()),
      points_earned: summary.points_earned,
    })
  }
}
