//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Grade, Language, NewQuizResult, QuizQuestion, QuizResult, Subject};
use crate::games::Feedback;
use crate::quiz::QuizSummary;
use crate::session::{Action, ActivityKind};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    StartSession {
        activity: ActivityKind,
        #[serde(default)]
        subject: Option<Subject>,
        #[serde(default)]
        grade: Option<Grade>,
        #[serde(default)]
        lang: Option<String>,
        #[serde(default)]
        user_id: Option<String>,
        #[serde(default)]
        activity_id: Option<String>,
    },
    Action {
        session_id: String,
        action: Action,
    },
    EndSession {
        session_id: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Session {
        session: serde_json::Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        feedback: Option<Feedback>,
    },
    Ended {
        session_id: String,
    },
    Error {
        message: String,
    },
}

/// Session snapshot plus the feedback of the action that produced it (if any).
/// Shared by WS and HTTP.
#[derive(Debug, Serialize)]
pub struct SessionOut {
    pub session: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub demo_mode: bool,
}

/// Query strings are taken as raw text and validated by the handlers, so bad
/// values get the same JSON error body as every other failure.
#[derive(Debug, Deserialize)]
pub struct QuestionsQuery {
    pub subject: Option<String>,
    pub grade: Option<String>,
    pub lang: Option<String>,
}

#[derive(Serialize)]
pub struct QuestionsOut {
    pub subject: Subject,
    pub grade: Grade,
    pub language: Language,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmitIn {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitOut {
    pub result: NewQuizResult,
    pub summary: QuizSummary,
    /// Row as stored by the backend; absent in demo mode.
    pub stored: Option<QuizResult>,
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub role: Option<String>,
    pub grade: Option<String>,
    pub lang: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActivitiesQuery {
    pub grade: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClassesQuery {
    pub teacher_id: Option<String>,
}

#[derive(Deserialize)]
pub struct PasswordIn {
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct OkOut {
    pub ok: bool,
}
