//! Demo stand-in used when no hosted backend is configured. Nothing is stored;
//! every call answers with fabricated, schema-shaped data.

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{Backend, BackendError, SignedIn};
use crate::domain::{
  Achievement, Activity, AuthSession, AuthUser, ClassRecord, ClassStudent, Grade, NewClass, NewProfile, NewQuizResult,
  ProgressRecord, ProgressUpdate, QuizResult, Role, Subject, UserProfile,
};
use crate::util::email_local_part;

const DEMO_GRADE: u8 = 8;
const MIN_DEMO_PASSWORD: usize = 4;

#[derive(Clone, Copy, Debug, Default)]
pub struct DemoBackend;

impl Backend for DemoBackend {
  async fn sign_up(&self, email: &str, _password: &str, profile: &NewProfile) -> Result<AuthUser, BackendError> {
    warn!(target: "auth", role = ?profile.role, "Demo mode: fabricating sign-up.");
    Ok(AuthUser { id: Uuid::new_v4().to_string(), email: Some(email.to_string()), created_at: Some(Utc::now()) })
  }

  async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, BackendError> {
    warn!(target: "auth", "Demo mode: fabricating sign-in.");
    if !email.contains('@') || password.chars().count() < MIN_DEMO_PASSWORD {
      return Err(BackendError::Rejected("Invalid credentials".into()));
    }
    let now = Utc::now();
    let profile = UserProfile {
      id: Uuid::new_v4().to_string(),
      email: email.to_string(),
      name: email_local_part(email).to_string(),
      role: Role::Student,
      grade: Grade::new(DEMO_GRADE),
      created_at: Some(now),
      updated_at: Some(now),
    };
    let user = AuthUser { id: profile.id.clone(), email: Some(email.to_string()), created_at: None };
    Ok(SignedIn { user, access_token: None, profile: Some(profile) })
  }

  async fn sign_out(&self, _access_token: Option<&str>) -> Result<(), BackendError> {
    Ok(())
  }

  async fn get_session(&self, _access_token: &str) -> Result<Option<AuthSession>, BackendError> {
    Ok(None)
  }

  async fn get_user_profile(&self, _user_id: &str) -> Result<Option<UserProfile>, BackendError> {
    Ok(None)
  }

  async fn get_progress(&self, _user_id: &str) -> Result<Vec<ProgressRecord>, BackendError> {
    Ok(Vec::new())
  }

  async fn update_progress(
    &self,
    _user_id: &str,
    _subject: Subject,
    _update: &ProgressUpdate,
  ) -> Result<Option<ProgressRecord>, BackendError> {
    Ok(None)
  }

  async fn get_activities(&self, _grade: Grade, _subject: Option<Subject>) -> Result<Vec<Activity>, BackendError> {
    Ok(Vec::new())
  }

  async fn submit_quiz_result(&self, result: &NewQuizResult) -> Result<Option<QuizResult>, BackendError> {
    debug!(target: "stem_quest", activity_id = %result.activity_id, score = result.score, "Demo mode: quiz result not stored.");
    Ok(None)
  }

  async fn get_achievements(&self, _user_id: &str) -> Result<Vec<Achievement>, BackendError> {
    Ok(Vec::new())
  }

  async fn get_classes(&self, _teacher_id: &str) -> Result<Vec<ClassRecord>, BackendError> {
    Ok(Vec::new())
  }

  async fn create_class(&self, _class: &NewClass) -> Result<Option<ClassRecord>, BackendError> {
    Ok(None)
  }

  async fn get_class_students(&self, _class_id: &str) -> Result<Vec<ClassStudent>, BackendError> {
    Ok(Vec::new())
  }

  async fn get_class_analytics(&self, _teacher_id: &str) -> Result<Option<Vec<ProgressRecord>>, BackendError> {
    Ok(None)
  }
}
