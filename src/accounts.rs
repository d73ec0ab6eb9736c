//! Sign-up / sign-in flows on top of the backend shim, with the login form's
//! validation rules and password strength meter.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::backend::{Backend, BackendError};
use crate::domain::{Grade, Language, NewProfile, Role, UserProfile};
use crate::i18n::messages;
use crate::util::email_local_part;

/// Login / sign-up form as submitted. Missing fields arrive empty and are
/// reported as validation errors rather than rejected by the JSON layer.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AccountForm {
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub password: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub role: Option<Role>,
  #[serde(default)]
  pub grade: Option<String>,
  #[serde(default)]
  pub lang: Option<String>,
}

impl AccountForm {
  pub fn language(&self) -> Language {
    Language::parse_or_default(self.lang.as_deref())
  }
}

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
  #[error("{0}")]
  Validation(&'static str),
  #[error("{0}")]
  LoginFailed(String),
  #[error("{0}")]
  SignUpFailed(String),
  #[error(transparent)]
  Backend(BackendError),
}

/// Signed-in user as handed to the client.
#[derive(Clone, Debug, Serialize)]
pub struct Account {
  pub profile: UserProfile,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub access_token: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
  pub score: u8,
  pub label: &'static str,
}

/// One point each for length >= 8, an uppercase letter, a digit and a symbol.
pub fn password_strength(password: &str) -> PasswordStrength {
  let checks = [
    password.chars().count() >= 8,
    password.chars().any(|c| c.is_ascii_uppercase()),
    password.chars().any(|c| c.is_ascii_digit()),
    password.chars().any(|c| !c.is_ascii_alphanumeric()),
  ];
  let score = checks.iter().filter(|ok| **ok).count() as u8;
  let label = match score {
    4 => "Ahha Genius",
    3 => "Good one",
    2 => "Weak Password",
    _ => "Very Weak",
  };
  PasswordStrength { score, label }
}

/// Checks shared by both forms. Returns the role and, for students, the grade.
fn validate(form: &AccountForm, signing_up: bool) -> Result<(Role, Option<Grade>), AccountError> {
  let t = messages(form.language());
  let role = match form.role {
    Some(r) if !form.email.trim().is_empty() && !form.password.is_empty() => r,
    _ => return Err(AccountError::Validation(t.required_fields)),
  };
  if signing_up && form.name.trim().is_empty() {
    return Err(AccountError::Validation(t.required_fields));
  }
  if role == Role::Teacher {
    return Ok((role, None));
  }
  let grade = form.grade.as_deref().and_then(Grade::parse).ok_or(AccountError::Validation(t.grade_required))?;
  Ok((role, Some(grade)))
}

#[instrument(level = "info", skip_all, fields(role = ?form.role))]
pub async fn sign_up(backend: &impl Backend, form: &AccountForm) -> Result<Account, AccountError> {
  let (role, grade) = validate(form, true)?;
  let email = form.email.trim();
  let name = form.name.trim().to_string();
  let new_profile = NewProfile { name: name.clone(), role, grade };
  let user = backend.sign_up(email, &form.password, &new_profile).await.map_err(|e| match e {
    BackendError::Rejected(msg) => AccountError::SignUpFailed(msg),
    other => AccountError::Backend(other),
  })?;
  info!(target: "auth", user_id = %user.id, ?role, "Account created");
  let profile = UserProfile {
    id: user.id,
    email: email.to_string(),
    name,
    role,
    grade,
    created_at: user.created_at,
    updated_at: None,
  };
  Ok(Account { profile, access_token: None })
}

#[instrument(level = "info", skip_all, fields(role = ?form.role))]
pub async fn sign_in(backend: &impl Backend, form: &AccountForm) -> Result<Account, AccountError> {
  validate(form, false)?;
  let t = messages(form.language());
  let email = form.email.trim();
  let signed_in = match backend.sign_in(email, &form.password).await {
    Ok(s) => s,
    Err(BackendError::Rejected(msg)) => {
      warn!(target: "auth", "Sign-in refused");
      return Err(AccountError::LoginFailed(msg));
    }
    Err(e) => return Err(AccountError::Backend(e)),
  };
  let Some(mut profile) = signed_in.profile else {
    return Err(AccountError::LoginFailed(t.login_error.to_string()));
  };
  if profile.name.trim().is_empty() {
    profile.name = if form.name.trim().is_empty() { email_local_part(email).to_string() } else { form.name.trim().to_string() };
  }
  info!(target: "auth", user_id = %profile.id, role = ?profile.role, "Signed in");
  Ok(Account { profile, access_token: signed_in.access_token })
}

/// Session restore: access token -> auth user -> profile. `None` when either is gone.
#[instrument(level = "info", skip_all)]
pub async fn restore_session(backend: &impl Backend, access_token: &str) -> Result<Option<Account>, AccountError> {
  let Some(session) = backend.get_session(access_token).await.map_err(AccountError::Backend)? else {
    return Ok(None);
  };
  let profile = backend.get_user_profile(&session.user.id).await.map_err(AccountError::Backend)?;
  Ok(profile.map(|profile| Account { profile, access_token: Some(session.access_token) }))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::backend::DemoBackend;

  fn form(email: &str, password: &str, role: Option<Role>, grade: Option<&str>) -> AccountForm {
    AccountForm {
      email: email.into(),
      password: password.into(),
      name: String::new(),
      role,
      grade: grade.map(String::from),
      lang: None,
    }
  }

  #[test]
  fn strength_labels() {
    assert_eq!(password_strength(""), PasswordStrength { score: 0, label: "Very Weak" });
    assert_eq!(password_strength("abcdefgh").label, "Very Weak");
    assert_eq!(password_strength("abcdefgH").label, "Weak Password");
    assert_eq!(password_strength("abcdefH1").label, "Good one");
    assert_eq!(password_strength("abcdeH1!"), PasswordStrength { score: 4, label: "Ahha Genius" });
  }

  #[test]
  fn validation_messages_are_localized() {
    let mut f = form("", "pw", Some(Role::Teacher), None);
    f.lang = Some("hi".into());
    match validate(&f, false) {
      Err(AccountError::Validation(msg)) => assert_eq!(msg, "कृपया सभी आवश्यक फ़ील्ड भरें"),
      other => panic!("unexpected {other:?}"),
    }
    let f = form("a@b.in", "pw", Some(Role::Student), Some("13"));
    match validate(&f, false) {
      Err(AccountError::Validation(msg)) => assert_eq!(msg, "Grade selection is required for students"),
      other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(validate(&form("a@b.in", "pw", None, None), false), Err(AccountError::Validation(_))));
    // Sign-up additionally needs a name.
    assert!(matches!(validate(&form("a@b.in", "pw", Some(Role::Teacher), None), true), Err(AccountError::Validation(_))));
    assert_eq!(validate(&form("a@b.in", "pw", Some(Role::Teacher), Some("9")), false).unwrap(), (Role::Teacher, None));
  }

  #[tokio::test]
  async fn demo_sign_in_and_refusal() {
    let ok = sign_in(&DemoBackend, &form("meera@school.in", "secret", Some(Role::Student), Some("7"))).await.unwrap();
    assert_eq!(ok.profile.name, "meera");
    assert_eq!(ok.profile.grade, Grade::new(8));
    match sign_in(&DemoBackend, &form("meera@school.in", "abc", Some(Role::Student), Some("7"))).await {
      Err(AccountError::LoginFailed(msg)) => assert_eq!(msg, "Invalid credentials"),
      other => panic!("unexpected {other:?}"),
    }
  }

  #[tokio::test]
  async fn demo_sign_up_builds_profile_from_form() {
    let mut f = form("ravi@school.in", "Secret1!", Some(Role::Student), Some("11"));
    f.name = "Ravi".into();
    let acct = sign_up(&DemoBackend, &f).await.unwrap();
    assert_eq!(acct.profile.name, "Ravi");
    assert_eq!(acct.profile.grade, Grade::new(11));
    assert_eq!(acct.profile.role, Role::Student);
    assert!(!acct.profile.id.is_empty());
  }

  #[tokio::test]
  async fn demo_has_no_sessions_to_restore() {
    assert!(restore_session(&DemoBackend, "token").await.unwrap().is_none());
  }
}
