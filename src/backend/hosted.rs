//! Minimal client for the hosted backend's auth (`/auth/v1`) and REST
//! (`/rest/v1/<table>`) endpoints.
//!
//! NOTE: passwords, the anon key and access tokens are never logged.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{Backend, BackendError, SignedIn};
use crate::domain::{
  Achievement, Activity, AuthSession, AuthUser, ClassRecord, ClassStudent, Grade, NewClass, NewProfile, NewQuizResult,
  ProgressRecord, ProgressUpdate, QuizResult, Role, Subject, UserProfile,
};

#[derive(Clone)]
pub struct HostedBackend {
  pub client: reqwest::Client,
  pub base_url: String,
  anon_key: String,
}

#[derive(Serialize)]
struct Credentials<'a> {
  email: &'a str,
  password: &'a str,
}

#[derive(Serialize)]
struct UserInsert<'a> {
  id: &'a str,
  email: &'a str,
  name: &'a str,
  role: Role,
  grade: Option<Grade>,
}

#[derive(Deserialize)]
struct TokenResponse {
  access_token: String,
  user: AuthUser,
}

/// Sign-up answers with the user itself, or with a session wrapping it when
/// email confirmation is disabled.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
  Session { user: AuthUser },
  User(AuthUser),
}

#[derive(Deserialize)]
struct IdRow {
  id: String,
}

#[derive(Deserialize)]
struct StudentIdRow {
  student_id: String,
}

impl HostedBackend {
  /// `None` unless SUPABASE_URL and SUPABASE_ANON_KEY are both set. A set of
  /// credentials whose HTTP client cannot be built comes back as the error.
  pub fn from_env() -> Option<Result<Self, BackendError>> {
    let base_url = std::env::var("SUPABASE_URL").ok().filter(|s| !s.trim().is_empty())?;
    let anon_key = std::env::var("SUPABASE_ANON_KEY").ok().filter(|s| !s.trim().is_empty())?;
    Some(Self::new(&base_url, anon_key))
  }

  pub fn new(base_url: &str, anon_key: String) -> Result<Self, BackendError> {
    let client = reqwest::Client::builder().timeout(Duration::from_secs(20)).build()?;
    Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string(), anon_key })
  }

  fn auth_url(&self, path: &str) -> String {
    format!("{}/auth/v1/{}", self.base_url, path)
  }

  fn rest_url(&self, table: &str) -> String {
    format!("{}/rest/v1/{}", self.base_url, table)
  }

  /// Every call carries the anon key; `token` (a user's access token) replaces it as bearer.
  fn request(&self, method: Method, url: &str, token: Option<&str>) -> RequestBuilder {
    self
      .client
      .request(method, url)
      .header(USER_AGENT, "stem-quest-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header("apikey", &self.anon_key)
      .header(AUTHORIZATION, format!("Bearer {}", token.unwrap_or(&self.anon_key)))
  }

  async fn send(&self, req: RequestBuilder) -> Result<Response, BackendError> {
    let res = req.send().await?;
    if res.status().is_success() {
      return Ok(res);
    }
    let status = res.status().as_u16();
    let body = res.text().await.unwrap_or_default();
    let message = extract_backend_error(&body).unwrap_or(body);
    // 4xx from the auth endpoints are verdicts on the request (bad password, taken email).
    if (400..500).contains(&status) && status != 404 {
      return Err(BackendError::Rejected(message));
    }
    Err(BackendError::Status { status, message })
  }

  async fn json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, BackendError> {
    let res = self.send(req).await?;
    res.json::<T>().await.map_err(|e| BackendError::Decode(e.to_string()))
  }

  #[instrument(level = "debug", skip(self, filters, token), fields(%table))]
  async fn select<T: DeserializeOwned>(
    &self,
    table: &str,
    columns: &str,
    filters: &[(&str, String)],
    token: Option<&str>,
  ) -> Result<Vec<T>, BackendError> {
    let req = self.request(Method::GET, &self.rest_url(table), token).query(&[("select", columns)]).query(filters);
    let rows: Vec<T> = self.json(req).await?;
    debug!(target: "stem_quest", %table, rows = rows.len(), "Backend select");
    Ok(rows)
  }

  /// Insert or update and return the single affected row (if the backend returned one).
  async fn write_one<B: Serialize + ?Sized, T: DeserializeOwned>(
    &self,
    method: Method,
    table: &str,
    filters: &[(&str, String)],
    body: &B,
  ) -> Result<Option<T>, BackendError> {
    let req = self
      .request(method, &self.rest_url(table), None)
      .header("Prefer", "return=representation")
      .query(filters)
      .json(body);
    let rows: Vec<T> = self.json(req).await?;
    Ok(rows.into_iter().next())
  }

  async fn profile_with_token(&self, user_id: &str, token: Option<&str>) -> Result<Option<UserProfile>, BackendError> {
    let rows = self.select::<UserProfile>("users", "*", &[("id", eq(user_id))], token).await?;
    Ok(rows.into_iter().next())
  }
}

fn eq(v: &str) -> String {
  format!("eq.{v}")
}

/// PostgREST `in.(a,b,c)` filter.
fn in_list(values: &[String]) -> String {
  format!("in.({})", values.join(","))
}

/// Try to extract a clean error message from an auth or REST error body.
fn extract_backend_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EObj {
    #[serde(default)] msg: Option<String>,
    #[serde(default)] message: Option<String>,
    #[serde(default)] error_description: Option<String>,
    #[serde(default)] error: Option<String>,
  }
  let e = serde_json::from_str::<EObj>(body).ok()?;
  e.error_description.or(e.msg).or(e.message).or(e.error)
}

impl Backend for HostedBackend {
  #[instrument(level = "info", skip(self, email, password, profile), fields(role = ?profile.role))]
  async fn sign_up(&self, email: &str, password: &str, profile: &NewProfile) -> Result<AuthUser, BackendError> {
    let req = self.request(Method::POST, &self.auth_url("signup"), None).json(&Credentials { email, password });
    let user = match self.json::<SignUpResponse>(req).await? {
      SignUpResponse::Session { user } | SignUpResponse::User(user) => user,
    };
    let row = UserInsert { id: &user.id, email, name: &profile.name, role: profile.role, grade: profile.grade };
    let req = self.request(Method::POST, &self.rest_url("users"), None).json(&row);
    self.send(req).await?;
    Ok(user)
  }

  #[instrument(level = "info", skip(self, email, password))]
  async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, BackendError> {
    let req = self
      .request(Method::POST, &self.auth_url("token"), None)
      .query(&[("grant_type", "password")])
      .json(&Credentials { email, password });
    let token: TokenResponse = self.json(req).await?;
    let profile = self.profile_with_token(&token.user.id, Some(&token.access_token)).await?;
    if profile.is_none() {
      return Err(BackendError::Decode("no profile row for the signed-in user".into()));
    }
    Ok(SignedIn { user: token.user, access_token: Some(token.access_token), profile })
  }

  #[instrument(level = "info", skip_all)]
  async fn sign_out(&self, access_token: Option<&str>) -> Result<(), BackendError> {
    let Some(token) = access_token else {
      return Ok(());
    };
    self.send(self.request(Method::POST, &self.auth_url("logout"), Some(token))).await?;
    Ok(())
  }

  #[instrument(level = "info", skip_all)]
  async fn get_session(&self, access_token: &str) -> Result<Option<AuthSession>, BackendError> {
    let req = self.request(Method::GET, &self.auth_url("user"), Some(access_token));
    match self.json::<AuthUser>(req).await {
      Ok(user) => Ok(Some(AuthSession { access_token: access_token.to_string(), user })),
      // Expired or revoked tokens simply mean there is no session.
      Err(BackendError::Rejected(_)) => Ok(None),
      Err(e) => Err(e),
    }
  }

  async fn get_user_profile(&self, user_id: &str) -> Result<Option<UserProfile>, BackendError> {
    self.profile_with_token(user_id, None).await
  }

  async fn get_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>, BackendError> {
    self.select("student_progress", "*", &[("user_id", eq(user_id))], None).await
  }

  #[instrument(level = "info", skip(self, update), fields(subject = subject.backend_key()))]
  async fn update_progress(
    &self,
    user_id: &str,
    subject: Subject,
    update: &ProgressUpdate,
  ) -> Result<Option<ProgressRecord>, BackendError> {
    let filters = [("user_id", eq(user_id)), ("subject", eq(subject.backend_key()))];
    self.write_one(Method::PATCH, "student_progress", &filters, update).await
  }

  async fn get_activities(&self, grade: Grade, subject: Option<Subject>) -> Result<Vec<Activity>, BackendError> {
    let mut filters = vec![("grade_level", eq(&grade.to_string()))];
    if let Some(s) = subject {
      filters.push(("subject", eq(s.backend_key())));
    }
    self.select("activities", "*", &filters, None).await
  }

  #[instrument(level = "info", skip(self, result), fields(activity_id = %result.activity_id, score = result.score))]
  async fn submit_quiz_result(&self, result: &NewQuizResult) -> Result<Option<QuizResult>, BackendError> {
    self.write_one(Method::POST, "quiz_results", &[], result).await
  }

  async fn get_achievements(&self, user_id: &str) -> Result<Vec<Achievement>, BackendError> {
    let filters = [("user_id", eq(user_id)), ("order", "earned_at.desc".to_string())];
    self.select("student_achievements", "*", &filters, None).await
  }

  async fn get_classes(&self, teacher_id: &str) -> Result<Vec<ClassRecord>, BackendError> {
    let filters = [("teacher_id", eq(teacher_id)), ("order", "created_at.desc".to_string())];
    self.select("classes", "*", &filters, None).await
  }

  #[instrument(level = "info", skip(self, class), fields(class_name = %class.class_name))]
  async fn create_class(&self, class: &NewClass) -> Result<Option<ClassRecord>, BackendError> {
    self.write_one(Method::POST, "classes", &[], class).await
  }

  async fn get_class_students(&self, class_id: &str) -> Result<Vec<ClassStudent>, BackendError> {
    let columns = "student_id,joined_at,users(id,name,email,grade)";
    self.select("class_students", columns, &[("class_id", eq(class_id))], None).await
  }

  #[instrument(level = "info", skip(self))]
  async fn get_class_analytics(&self, teacher_id: &str) -> Result<Option<Vec<ProgressRecord>>, BackendError> {
    let classes: Vec<IdRow> = self.select("classes", "id", &[("teacher_id", eq(teacher_id))], None).await?;
    if classes.is_empty() {
      return Ok(None);
    }
    let class_ids: Vec<String> = classes.into_iter().map(|c| c.id).collect();
    let students: Vec<StudentIdRow> =
      self.select("class_students", "student_id", &[("class_id", in_list(&class_ids))], None).await?;
    if students.is_empty() {
      return Ok(None);
    }
    let student_ids: Vec<String> = students.into_iter().map(|s| s.student_id).collect();
    let progress = self.select("student_progress", "*", &[("user_id", in_list(&student_ids))], None).await?;
    Ok(Some(progress))
  }
}
