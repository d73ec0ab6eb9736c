//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Starting, advancing, reading and dropping play sessions
//!   - Submitting completed quizzes as results through the backend
//!   - Question lookup and dashboard assembly with lenient query parsing

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::backend::Backend;
use crate::dashboard::{self, Dashboard};
use crate::domain::{Grade, Language, Role, Subject};
use crate::error::AppError;
use crate::protocol::{QuestionsOut, SessionOut, SubmitOut};
use crate::session::{Action, ActivityKind, Session, SessionError, SessionRequest};
use crate::state::AppState;

fn snapshot(session: &Session) -> Result<serde_json::Value, AppError> {
  serde_json::to_value(session.view()).map_err(|e| AppError::Internal(e.to_string()))
}

pub fn parse_subject(raw: Option<&str>) -> Result<Subject, AppError> {
  let raw = raw.unwrap_or_default();
  Subject::parse(raw).ok_or_else(|| AppError::Validation(format!("unknown subject {raw:?}")))
}

/// Missing grade means "6"; a present but invalid one is an error.
pub fn parse_grade(raw: Option<&str>) -> Result<Grade, AppError> {
  match raw.map(str::trim).filter(|s| !s.is_empty()) {
    None => Ok(Grade::default()),
    Some(s) => Grade::parse(s).ok_or_else(|| AppError::Validation(format!("grade must be \"6\"..\"12\", got {s:?}"))),
  }
}

pub fn parse_role(raw: Option<&str>) -> Result<Role, AppError> {
  match raw.map(str::trim) {
    Some("teacher") => Ok(Role::Teacher),
    Some("student") | None => Ok(Role::Student),
    Some(other) => Err(AppError::Validation(format!("unknown role {other:?}"))),
  }
}

#[instrument(level = "info", skip(state))]
pub fn list_questions(state: &AppState, subject: Option<&str>, grade: Option<&str>, lang: Option<&str>) -> Result<QuestionsOut, AppError> {
  let subject = parse_subject(subject)?;
  let grade = parse_grade(grade)?;
  let language = Language::parse_or_default(lang);
  let questions = state.bank.questions(subject, language, grade).to_vec();
  debug!(target: "quiz", subject = subject.key(), %grade, lang = language.code(), count = questions.len(), "Questions served");
  Ok(QuestionsOut { subject, grade, language, questions })
}

#[instrument(level = "info", skip(state))]
pub fn build_dashboard(state: &AppState, role: Option<&str>, grade: Option<&str>, lang: Option<&str>) -> Result<Dashboard, AppError> {
  let role = parse_role(role)?;
  let grade = parse_grade(grade)?;
  Ok(dashboard::build(role, Some(grade), Language::parse_or_default(lang), &state.bank))
}

#[instrument(level = "info", skip(state, req), fields(activity = req.activity.key()))]
pub async fn start_session(state: &AppState, req: SessionRequest) -> Result<SessionOut, AppError> {
  let session = Session::start(req, &state.bank, &state.config, &mut rand::thread_rng())?;
  let out = SessionOut { session: snapshot(&session)?, feedback: None };
  let kind = session.activity.kind();
  info!(target: "stem_quest", id = %session.id, activity = kind.key(), activity_id = %session.activity_id, lang = session.language.code(), "Session started");
  state.insert_session(session).await;
  Ok(out)
}

#[instrument(level = "debug", skip(state))]
pub async fn session_snapshot(state: &AppState, id: &str) -> Result<SessionOut, AppError> {
  let sessions = state.sessions.read().await;
  let session = sessions.get(id).ok_or_else(|| AppError::unknown_session(id))?;
  Ok(SessionOut { session: snapshot(session)?, feedback: None })
}

#[instrument(level = "info", skip(state, action), fields(action = action.name()))]
pub async fn apply_action(state: &AppState, id: &str, action: Action) -> Result<SessionOut, AppError> {
  let mut sessions = state.sessions.write().await;
  let session = sessions.get_mut(id).ok_or_else(|| AppError::unknown_session(id))?;
  let name = action.name();
  session.last_active = Utc::now();
  let feedback = session.apply(action, &mut rand::thread_rng())?;
  let kind = session.activity.kind();
  let correct = feedback.as_ref().map(|f| f.correct);
  if kind == ActivityKind::Quiz {
    debug!(target: "quiz", %id, action = name, score = session.activity.score(), ?correct, "Quiz action applied");
  } else {
    debug!(target: "game", %id, game = kind.key(), action = name, score = session.activity.score(), ?correct, finished = session.activity.is_finished(), "Game action applied");
  }
  Ok(SessionOut { session: snapshot(session)?, feedback })
}

#[instrument(level = "info", skip(state))]
pub async fn end_session(state: &AppState, id: &str) -> Result<(), AppError> {
  if !state.remove_session(id).await {
    return Err(AppError::unknown_session(id));
  }
  info!(target: "stem_quest", %id, "Session ended");
  Ok(())
}

/// Turn a completed quiz into a result and hand it to the backend. The
/// session lock is released before the backend call.
#[instrument(level = "info", skip(state, user_id))]
pub async fn submit_session(state: &AppState, id: &str, user_id: Option<String>) -> Result<SubmitOut, AppError> {
  let (result, summary) = {
    let sessions = state.sessions.read().await;
    let session = sessions.get(id).ok_or_else(|| AppError::unknown_session(id))?;
    let user_id = user_id
      .filter(|u| !u.trim().is_empty())
      .or_else(|| session.user_id.clone())
      .ok_or_else(|| AppError::Validation("a user_id is required to submit a quiz result".into()))?;
    let result = session.quiz_result(&user_id, Utc::now())?;
    let summary = session.quiz_summary().ok_or(SessionError::QuizNotComplete)?;
    (result, summary)
  };
  let stored = state.backend.submit_quiz_result(&result).await?;
  info!(target: "quiz", %id, activity_id = %result.activity_id, score = result.score, max_score = result.max_score, stored = stored.is_some(), "Quiz result submitted");
  Ok(SubmitOut { result, summary, stored })
}
