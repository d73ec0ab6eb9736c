//! Service-level error: every failure becomes a status code plus a
//! `{ "error": "<message>" }` body.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use tracing::{error, warn};

use crate::accounts::AccountError;
use crate::backend::BackendError;
use crate::session::SessionError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
  #[error("{0}")]
  Validation(String),
  #[error("{0}")]
  NotFound(String),
  #[error(transparent)]
  Session(#[from] SessionError),
  #[error(transparent)]
  Account(#[from] AccountError),
  #[error(transparent)]
  Backend(#[from] BackendError),
  #[error("internal error: {0}")]
  Internal(String),
}

impl AppError {
  pub fn unknown_session(id: &str) -> Self {
    AppError::NotFound(format!("unknown session {id:?}"))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Session(SessionError::MissingSubject) => StatusCode::BAD_REQUEST,
      AppError::Session(_) => StatusCode::CONFLICT,
      AppError::Account(AccountError::Validation(_)) => StatusCode::BAD_REQUEST,
      AppError::Account(AccountError::LoginFailed(_)) => StatusCode::UNAUTHORIZED,
      AppError::Account(AccountError::SignUpFailed(_)) => StatusCode::BAD_REQUEST,
      AppError::Account(AccountError::Backend(e)) | AppError::Backend(e) => backend_status(e),
      AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

fn backend_status(e: &BackendError) -> StatusCode {
  match e {
    BackendError::Rejected(_) => StatusCode::BAD_REQUEST,
    _ => StatusCode::BAD_GATEWAY,
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = self.to_string();
    if status.is_server_error() {
      error!(target: "stem_quest", %status, error = %message, "Request failed");
    } else {
      warn!(target: "stem_quest", %status, error = %message, "Request rejected");
    }
    (status, Json(serde_json::json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::games::GameError;
  use crate::quiz::QuizError;

  #[test]
  fn statuses_follow_the_error_kind() {
    assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::unknown_session("abc").status(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::from(SessionError::from(QuizError::NothingSelected)).status(), StatusCode::CONFLICT);
    assert_eq!(AppError::from(SessionError::from(GameError::Finished)).status(), StatusCode::CONFLICT);
    assert_eq!(AppError::from(SessionError::MissingSubject).status(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::from(AccountError::LoginFailed("no".into())).status(), StatusCode::UNAUTHORIZED);
    let upstream = BackendError::Status { status: 500, message: "boom".into() };
    assert_eq!(AppError::from(upstream).status(), StatusCode::BAD_GATEWAY);
  }

  #[test]
  fn messages_pass_through() {
    let e = AppError::from(SessionError::from(QuizError::NothingSelected));
    assert_eq!(e.to_string(), "select an option before submitting");
    assert_eq!(AppError::unknown_session("abc").to_string(), "unknown session \"abc\"");
  }
}
