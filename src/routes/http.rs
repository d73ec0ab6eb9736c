//! HTTP endpoint handlers. These are thin wrappers that forward to core logic
//! or to the backend shim. Each handler is instrumented; failures come back as
//! `AppError`, which renders the JSON error body.

use std::sync::Arc;
use axum::{
  body::Bytes,
  extract::{rejection::JsonRejection, Path, Query, State},
  http::{header, HeaderMap},
  Json,
};
use tracing::{info, instrument};

use crate::accounts::{self, Account, AccountForm, PasswordStrength};
use crate::backend::Backend;
use crate::dashboard::Dashboard;
use crate::domain::{
  Achievement, Activity, ClassRecord, ClassStudent, NewClass, NewQuizResult, ProgressRecord, ProgressUpdate, QuizResult,
  UserProfile,
};
use crate::error::AppError;
use crate::logic::*;
use crate::protocol::*;
use crate::session::{Action, SessionRequest};
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, AppError>;

/// Unwrap a JSON body, turning axum's rejection into our 400 body.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
  payload.map(|Json(v)| v).map_err(|e| AppError::Validation(e.body_text()))
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> Json<HealthOut> {
  Json(HealthOut { ok: true, demo_mode: state.backend.is_demo() })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_questions(State(state): State<Arc<AppState>>, Query(q): Query<QuestionsQuery>) -> ApiResult<QuestionsOut> {
  let out = list_questions(&state, q.subject.as_deref(), q.grade.as_deref(), q.lang.as_deref())?;
  Ok(Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_dashboard(State(state): State<Arc<AppState>>, Query(q): Query<DashboardQuery>) -> ApiResult<Dashboard> {
  Ok(Json(build_dashboard(&state, q.role.as_deref(), q.grade.as_deref(), q.lang.as_deref())?))
}

#[instrument(level = "debug", skip_all)]
pub async fn http_post_password_strength(payload: Result<Json<PasswordIn>, JsonRejection>) -> ApiResult<PasswordStrength> {
  let PasswordIn { password } = body(payload)?;
  Ok(Json(accounts::password_strength(&password)))
}

//
// Play sessions
//

#[instrument(level = "info", skip_all)]
pub async fn http_post_session(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<SessionRequest>, JsonRejection>,
) -> ApiResult<SessionOut> {
  Ok(Json(start_session(&state, body(payload)?).await?))
}

#[instrument(level = "debug", skip(state))]
pub async fn http_get_session(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<SessionOut> {
  Ok(Json(session_snapshot(&state, &id).await?))
}

#[instrument(level = "info", skip(state, payload))]
pub async fn http_post_action(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  payload: Result<Json<Action>, JsonRejection>,
) -> ApiResult<SessionOut> {
  Ok(Json(apply_action(&state, &id, body(payload)?).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_session(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<OkOut> {
  end_session(&state, &id).await?;
  Ok(Json(OkOut { ok: true }))
}

/// The body is optional; without one the user id recorded at session start is
/// used. A body that is present must be a valid `SubmitIn`.
#[instrument(level = "info", skip(state, raw), fields(body_len = raw.len()))]
pub async fn http_post_submit(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  raw: Bytes,
) -> ApiResult<SubmitOut> {
  let SubmitIn { user_id } = if raw.iter().all(u8::is_ascii_whitespace) {
    SubmitIn::default()
  } else {
    serde_json::from_slice(&raw).map_err(|e| AppError::Validation(format!("invalid submit body: {e}")))?
  };
  Ok(Json(submit_session(&state, &id, user_id).await?))
}

//
// Accounts
//

#[instrument(level = "info", skip_all)]
pub async fn http_post_signup(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<AccountForm>, JsonRejection>,
) -> ApiResult<Account> {
  let form = body(payload)?;
  Ok(Json(accounts::sign_up(&state.backend, &form).await?))
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_signin(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<AccountForm>, JsonRejection>,
) -> ApiResult<Account> {
  let form = body(payload)?;
  Ok(Json(accounts::sign_in(&state.backend, &form).await?))
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_signout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> ApiResult<OkOut> {
  state.backend.sign_out(bearer(&headers)).await?;
  info!(target: "auth", "Signed out");
  Ok(Json(OkOut { ok: true }))
}

/// `null` when the token no longer maps to a user with a profile.
#[instrument(level = "info", skip_all)]
pub async fn http_get_auth_session(State(state): State<Arc<AppState>>, headers: HeaderMap) -> ApiResult<Option<Account>> {
  let token = bearer(&headers).ok_or_else(|| AppError::Validation("missing bearer token".into()))?;
  Ok(Json(accounts::restore_session(&state.backend, token).await?))
}

//
// Backend records
//

#[instrument(level = "info", skip(state))]
pub async fn http_get_user(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<UserProfile> {
  let profile = state.backend.get_user_profile(&id).await?;
  profile.map(Json).ok_or_else(|| AppError::NotFound(format!("unknown user {id:?}")))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_progress(State(state): State<Arc<AppState>>, Path(user_id): Path<String>) -> ApiResult<Vec<ProgressRecord>> {
  Ok(Json(state.backend.get_progress(&user_id).await?))
}

#[instrument(level = "info", skip(state, payload))]
pub async fn http_patch_progress(
  State(state): State<Arc<AppState>>,
  Path((user_id, subject)): Path<(String, String)>,
  payload: Result<Json<ProgressUpdate>, JsonRejection>,
) -> ApiResult<Option<ProgressRecord>> {
  let subject = parse_subject(Some(&subject))?;
  let update = body(payload)?;
  Ok(Json(state.backend.update_progress(&user_id, subject, &update).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_activities(State(state): State<Arc<AppState>>, Query(q): Query<ActivitiesQuery>) -> ApiResult<Vec<Activity>> {
  let grade = parse_grade(q.grade.as_deref())?;
  let subject = match q.subject.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
    Some(s) => Some(parse_subject(Some(s))?),
    None => None,
  };
  Ok(Json(state.backend.get_activities(grade, subject).await?))
}

/// Direct submission of a result computed by the client.
#[instrument(level = "info", skip_all)]
pub async fn http_post_quiz_result(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<NewQuizResult>, JsonRejection>,
) -> ApiResult<Option<QuizResult>> {
  let result = body(payload)?;
  Ok(Json(state.backend.submit_quiz_result(&result).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_achievements(State(state): State<Arc<AppState>>, Path(user_id): Path<String>) -> ApiResult<Vec<Achievement>> {
  Ok(Json(state.backend.get_achievements(&user_id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_classes(State(state): State<Arc<AppState>>, Query(q): Query<ClassesQuery>) -> ApiResult<Vec<ClassRecord>> {
  let teacher_id = q
    .teacher_id
    .filter(|t| !t.trim().is_empty())
    .ok_or_else(|| AppError::Validation("teacher_id is required".into()))?;
  Ok(Json(state.backend.get_classes(&teacher_id).await?))
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_class(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<NewClass>, JsonRejection>,
) -> ApiResult<Option<ClassRecord>> {
  let class = body(payload)?;
  if class.class_name.trim().is_empty() || class.teacher_id.trim().is_empty() {
    return Err(AppError::Validation("class_name and teacher_id are required".into()));
  }
  Ok(Json(state.backend.create_class(&class).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_class_students(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<Vec<ClassStudent>> {
  Ok(Json(state.backend.get_class_students(&id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_analytics(
  State(state): State<Arc<AppState>>,
  Path(teacher_id): Path<String>,
) -> ApiResult<Option<Vec<ProgressRecord>>> {
  Ok(Json(state.backend.get_class_analytics(&teacher_id).await?))
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::body::Body;
  use axum::http::{Request, StatusCode};
  use axum::Router;
  use serde_json::{json, Value};
  use tower::ServiceExt;

  use crate::backend::{BackendClient, DemoBackend};
  use crate::config::AppConfig;
  use crate::routes::build_router;

  fn app() -> Router {
    build_router(Arc::new(AppState::with_parts(AppConfig::default(), BackendClient::Demo(DemoBackend))))
  }

  async fn call(app: &Router, method: &str, uri: &str, payload: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match payload {
      Some(v) => builder.header("content-type", "application/json").body(Body::from(v.to_string())),
      None => builder.body(Body::empty()),
    }
    .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
  }

  #[tokio::test]
  async fn health_reports_demo_mode() {
    let (status, v) = call(&app(), "GET", "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, json!({ "ok": true, "demo_mode": true }));
  }

  #[tokio::test]
  async fn bad_queries_get_a_json_error() {
    let app = app();
    let (status, v) = call(&app, "GET", "/api/v1/questions?grade=7", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(v["error"].as_str().unwrap().contains("subject"));

    let (status, v) = call(&app, "GET", "/api/v1/questions?subject=math&grade=13", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(v["error"].is_string());

    let (status, v) = call(&app, "GET", "/api/v1/questions?subject=mathematics&grade=7&lang=hi", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["subject"], "math");
    assert_eq!(v["language"], "hi");
    assert!(!v["questions"].as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn session_round_trip_over_http() {
    let app = app();
    let (status, v) = call(&app, "POST", "/api/v1/sessions", Some(json!({ "activity": "bridge" }))).await;
    assert_eq!(status, StatusCode::OK);
    let id = v["session"]["id"].as_str().unwrap().to_string();
    let actions = format!("/api/v1/sessions/{id}/actions");

    let (status, v) = call(&app, "POST", &actions, Some(json!({ "type": "pick", "card": 0 }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(v["error"].is_string());

    for _ in 0..5 {
      let (status, _) = call(&app, "POST", &actions, Some(json!({ "type": "add_material", "material": "steel" }))).await;
      assert_eq!(status, StatusCode::OK);
    }
    let (_, v) = call(&app, "POST", &actions, Some(json!({ "type": "test" }))).await;
    assert_eq!(v["feedback"]["correct"], true);
    assert_eq!(v["session"]["state"]["score"], 130);

    let (status, v) = call(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["session"]["activity_id"], "game-bridge");

    let (status, _) = call(&app, "DELETE", &format!("/api/v1/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, "POST", &actions, Some(json!({ "type": "reset_bridge" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn submit_body_is_optional_but_must_be_valid() {
    let app = app();
    let start = json!({ "activity": "quiz", "subject": "math", "grade": "6", "user_id": "u1" });
    let (_, v) = call(&app, "POST", "/api/v1/sessions", Some(start)).await;
    let submit = format!("/api/v1/sessions/{}/submit", v["session"]["id"].as_str().unwrap());

    let (status, v) = call(&app, "POST", &submit, Some(json!({ "user_id": 5 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(v["error"].as_str().unwrap().starts_with("invalid submit body"));

    // No body: falls through to the session's own user id, then fails on the unfinished quiz.
    let (status, _) = call(&app, "POST", &submit, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn malformed_bodies_are_rejected_with_400() {
    let app = app();
    let (status, v) = call(&app, "POST", "/api/v1/sessions", Some(json!({ "activity": "chess" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(v["error"].is_string());
    let (status, _) = call(&app, "POST", "/api/v1/sessions", Some(json!({ "activity": "quiz" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn demo_sign_in_and_validation() {
    let app = app();
    let form = json!({ "email": "asha@school.in", "password": "secret", "role": "student", "grade": "8" });
    let (status, v) = call(&app, "POST", "/api/v1/auth/signin", Some(form)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["profile"]["name"], "asha");
    assert_eq!(v["profile"]["role"], "student");

    let short = json!({ "email": "asha@school.in", "password": "abc", "role": "student", "grade": "8" });
    let (status, v) = call(&app, "POST", "/api/v1/auth/signin", Some(short)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(v["error"], "Invalid credentials");

    let no_grade = json!({ "email": "a@b.c", "password": "secret", "role": "student", "lang": "hi" });
    let (status, v) = call(&app, "POST", "/api/v1/auth/signin", Some(no_grade)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(v["error"].is_string());

    let (status, _) = call(&app, "GET", "/api/v1/auth/session", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn demo_records_are_empty() {
    let app = app();
    let (status, v) = call(&app, "GET", "/api/v1/progress/u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, json!([]));
    let (status, v) = call(&app, "GET", "/api/v1/analytics/t1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, Value::Null);
    let (status, _) = call(&app, "GET", "/api/v1/users/u1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, "GET", "/api/v1/classes", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = call(&app, "PATCH", "/api/v1/progress/u1/art", Some(json!({ "points": 5 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn dashboards_and_password_meter() {
    let app = app();
    let (_, v) = call(&app, "GET", "/api/v1/dashboard?role=teacher", None).await;
    assert_eq!(v["role"], "teacher");
    assert_eq!(v["classes"].as_array().unwrap().len(), 4);
    let (_, v) = call(&app, "GET", "/api/v1/dashboard", None).await;
    assert_eq!(v["role"], "student");
    assert_eq!(v["grade"], "6");

    let (_, v) = call(&app, "POST", "/api/v1/password-strength", Some(json!({ "password": "Abcdefg1!" }))).await;
    assert_eq!(v, json!({ "score": 4, "label": "Ahha Genius" }));
  }
}
