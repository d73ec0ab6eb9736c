//! Access to the hosted backend-as-a-service (accounts, progress, classes,
//! quiz results), or to a local demo stand-in when no credentials are set.
//!
//! The strategy is chosen once at startup (`BackendClient::from_env`); callers
//! only ever see the `Backend` trait and never branch on the mode themselves.

use std::future::Future;

use tracing::{error, info};

use crate::domain::{
  Achievement, Activity, AuthSession, AuthUser, ClassRecord, ClassStudent, Grade, NewClass, NewProfile, NewQuizResult,
  ProgressRecord, ProgressUpdate, QuizResult, Subject, UserProfile,
};

pub mod demo;
pub mod hosted;

pub use demo::DemoBackend;
pub use hosted::HostedBackend;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
  #[error("backend request failed: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("backend returned HTTP {status}: {message}")]
  Status { status: u16, message: String },
  /// The backend refused the request on its merits (bad credentials, ...).
  #[error("{0}")]
  Rejected(String),
  #[error("unexpected backend response: {0}")]
  Decode(String),
}

/// Outcome of a successful password sign-in.
#[derive(Clone, Debug, serde::Serialize)]
pub struct SignedIn {
  pub user: AuthUser,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub access_token: Option<String>,
  pub profile: Option<UserProfile>,
}

pub trait Backend: Send + Sync {
  fn sign_up(
    &self,
    email: &str,
    password: &str,
    profile: &NewProfile,
  ) -> impl Future<Output = Result<AuthUser, BackendError>> + Send;

  fn sign_in(&self, email: &str, password: &str) -> impl Future<Output = Result<SignedIn, BackendError>> + Send;

  fn sign_out(&self, access_token: Option<&str>) -> impl Future<Output = Result<(), BackendError>> + Send;

  fn get_session(&self, access_token: &str) -> impl Future<Output = Result<Option<AuthSession>, BackendError>> + Send;

  fn get_user_profile(&self, user_id: &str) -> impl Future<Output = Result<Option<UserProfile>, BackendError>> + Send;

  fn get_progress(&self, user_id: &str) -> impl Future<Output = Result<Vec<ProgressRecord>, BackendError>> + Send;

  fn update_progress(
    &self,
    user_id: &str,
    subject: Subject,
    update: &ProgressUpdate,
  ) -> impl Future<Output = Result<Option<ProgressRecord>, BackendError>> + Send;

  fn get_activities(
    &self,
    grade: Grade,
    subject: Option<Subject>,
  ) -> impl Future<Output = Result<Vec<Activity>, BackendError>> + Send;

  fn submit_quiz_result(
    &self,
    result: &NewQuizResult,
  ) -> impl Future<Output = Result<Option<QuizResult>, BackendError>> + Send;

  fn get_achievements(&self, user_id: &str) -> impl Future<Output = Result<Vec<Achievement>, BackendError>> + Send;

  fn get_classes(&self, teacher_id: &str) -> impl Future<Output = Result<Vec<ClassRecord>, BackendError>> + Send;

  fn create_class(&self, class: &NewClass) -> impl Future<Output = Result<Option<ClassRecord>, BackendError>> + Send;

  fn get_class_students(&self, class_id: &str) -> impl Future<Output = Result<Vec<ClassStudent>, BackendError>> + Send;

  /// Progress rows of every student enrolled in the teacher's classes.
  /// `None` when the teacher has no classes or the classes have no students.
  fn get_class_analytics(
    &self,
    teacher_id: &str,
  ) -> impl Future<Output = Result<Option<Vec<ProgressRecord>>, BackendError>> + Send;
}

/// The strategy picked at startup.
#[derive(Clone)]
pub enum BackendClient {
  Hosted(HostedBackend),
  Demo(DemoBackend),
}

impl BackendClient {
  /// Hosted when SUPABASE_URL and SUPABASE_ANON_KEY are both set, demo otherwise.
  pub fn from_env() -> Self {
    Self::select(HostedBackend::from_env())
  }

  fn select(hosted: Option<Result<HostedBackend, BackendError>>) -> Self {
    match hosted {
      Some(Ok(hosted)) => {
        info!(target: "stem_quest", base_url = %hosted.base_url, "Hosted backend enabled.");
        BackendClient::Hosted(hosted)
      }
      Some(Err(e)) => {
        error!(target: "stem_quest", error = %e, "Hosted backend is configured but its HTTP client failed to build. Running in demo mode.");
        BackendClient::Demo(DemoBackend)
      }
      None => {
        info!(target: "stem_quest", "Hosted backend not configured (SUPABASE_URL / SUPABASE_ANON_KEY). Running in demo mode.");
        BackendClient::Demo(DemoBackend)
      }
    }
  }

  pub fn is_demo(&self) -> bool {
    matches!(self, BackendClient::Demo(_))
  }
}

macro_rules! delegate {
  ($self:ident, $method:ident ( $($arg:expr),* )) => {
    match $self {
      BackendClient::Hosted(b) => b.$method($($arg),*).await,
      BackendClient::Demo(b) => b.$method($($arg),*).await,
    }
  };
}

impl Backend for BackendClient {
  async fn sign_up(&self, email: &str, password: &str, profile: &NewProfile) -> Result<AuthUser, BackendError> {
    delegate!(self, sign_up(email, password, profile))
  }

  async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, BackendError> {
    delegate!(self, sign_in(email, password))
  }

  async fn sign_out(&self, access_token: Option<&str>) -> Result<(), BackendError> {
    delegate!(self, sign_out(access_token))
  }

  async fn get_session(&self, access_token: &str) -> Result<Option<AuthSession>, BackendError> {
    delegate!(self, get_session(access_token))
  }

  async fn get_user_profile(&self, user_id: &str) -> Result<Option<UserProfile>, BackendError> {
    delegate!(self, get_user_profile(user_id))
  }

  async fn get_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>, BackendError> {
    delegate!(self, get_progress(user_id))
  }

  async fn update_progress(
    &self,
    user_id: &str,
    subject: Subject,
    update: &ProgressUpdate,
  ) -> Result<Option<ProgressRecord>, BackendError> {
    delegate!(self, update_progress(user_id, subject, update))
  }

  async fn get_activities(&self, grade: Grade, subject: Option<Subject>) -> Result<Vec<Activity>, BackendError> {
    delegate!(self, get_activities(grade, subject))
  }

  async fn submit_quiz_result(&self, result: &NewQuizResult) -> Result<Option<QuizResult>, BackendError> {
    delegate!(self, submit_quiz_result(result))
  }

  async fn get_achievements(&self, user_id: &str) -> Result<Vec<Achievement>, BackendError> {
    delegate!(self, get_achievements(user_id))
  }

  async fn get_classes(&self, teacher_id: &str) -> Result<Vec<ClassRecord>, BackendError> {
    delegate!(self, get_classes(teacher_id))
  }

  async fn create_class(&self, class: &NewClass) -> Result<Option<ClassRecord>, BackendError> {
    delegate!(self, create_class(class))
  }

  async fn get_class_students(&self, class_id: &str) -> Result<Vec<ClassStudent>, BackendError> {
    delegate!(self, get_class_students(class_id))
  }

  async fn get_class_analytics(&self, teacher_id: &str) -> Result<Option<Vec<ProgressRecord>>, BackendError> {
    delegate!(self, get_class_analytics(teacher_id))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strategy_follows_configuration() {
    assert!(BackendClient::select(None).is_demo());
    let broken = Err(BackendError::Decode("client builder failed".into()));
    assert!(BackendClient::select(Some(broken)).is_demo());
    let hosted = HostedBackend::new("https://demo.example.co", "anon".into());
    assert!(matches!(BackendClient::select(Some(hosted)), BackendClient::Hosted(b) if b.base_url == "https://demo.example.co"));
  }
}
