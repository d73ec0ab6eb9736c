//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request;
//! failures become an `error` reply and the connection stays open.
//! Sessions started over a socket belong to it and are dropped when it closes.

use std::{collections::HashSet, sync::Arc};
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic::*;
use crate::protocol::{ClientWsMessage, ServerWsMessage, SessionOut};
use crate::session::SessionRequest;
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "stem_quest", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "stem_quest", "WebSocket connected");
  let mut conn = Connection::new(state);
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "stem_quest", "WS received: {:?}", &incoming);
            conn.handle(incoming).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "stem_quest", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  let released = conn.close().await;
  info!(target: "stem_quest", released, "WebSocket disconnected");
}

/// Per-socket state: the sessions this connection started and has not ended.
struct Connection {
  state: Arc<AppState>,
  owned: HashSet<String>,
}

impl Connection {
  fn new(state: Arc<AppState>) -> Self {
    Self { state, owned: HashSet::new() }
  }

  async fn handle(&mut self, msg: ClientWsMessage) -> ServerWsMessage {
    let starting = matches!(msg, ClientWsMessage::StartSession { .. });
    let reply = handle_client_ws(msg, &self.state).await;
    match &reply {
      ServerWsMessage::Session { session, .. } if starting => {
        if let Some(id) = session.get("id").and_then(serde_json::Value::as_str) {
          self.owned.insert(id.to_string());
        }
      }
      ServerWsMessage::Ended { session_id } => {
        self.owned.remove(session_id);
      }
      _ => {}
    }
    reply
  }

  /// Drop every session still owned. Returns how many were removed.
  async fn close(self) -> usize {
    self.state.remove_sessions(&self.owned).await
  }
}

fn session_reply(out: SessionOut) -> ServerWsMessage {
  ServerWsMessage::Session { session: out.session, feedback: out.feedback }
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  let result = match msg {
    ClientWsMessage::Ping => return ServerWsMessage::Pong,

    ClientWsMessage::StartSession { activity, subject, grade, lang, user_id, activity_id } => {
      let req = SessionRequest { activity, subject, grade, lang, user_id, activity_id };
      start_session(state, req).await.map(session_reply)
    }

    ClientWsMessage::Action { session_id, action } => apply_action(state, &session_id, action).await.map(session_reply),

    ClientWsMessage::EndSession { session_id } => {
      end_session(state, &session_id).await.map(|()| ServerWsMessage::Ended { session_id })
    }
  };
  result.unwrap_or_else(|e| {
    debug!(target: "stem_quest", error = %e, "WS request rejected");
    ServerWsMessage::Error { message: e.to_string() }
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::backend::{BackendClient, DemoBackend};
  use crate::config::AppConfig;

  fn state() -> AppState {
    AppState::with_parts(AppConfig::default(), BackendClient::Demo(DemoBackend))
  }

  async fn send(state: &AppState, raw: &str) -> serde_json::Value {
    let msg: ClientWsMessage = serde_json::from_str(raw).unwrap();
    serde_json::to_value(handle_client_ws(msg, state).await).unwrap()
  }

  #[tokio::test]
  async fn ping_and_session_flow() {
    let st = state();
    assert_eq!(send(&st, r#"{"type":"ping"}"#).await["type"], "pong");

    let v = send(&st, r#"{"type":"start_session","activity":"arithmetic","grade":"9"}"#).await;
    assert_eq!(v["type"], "session");
    assert_eq!(v["session"]["activity_id"], "game-arithmetic-9");
    let id = v["session"]["id"].as_str().unwrap().to_string();

    let action = serde_json::json!({ "type": "action", "session_id": id, "action": { "type": "answer", "value": "" } });
    let v = send(&st, &action.to_string()).await;
    assert_eq!(v["type"], "error");

    let end = serde_json::json!({ "type": "end_session", "session_id": id });
    let v = send(&st, &end.to_string()).await;
    assert_eq!(v, serde_json::json!({ "type": "ended", "session_id": id }));
    let v = send(&st, &end.to_string()).await;
    assert_eq!(v["type"], "error");
  }

  #[tokio::test]
  async fn closing_a_socket_drops_only_its_own_sessions() {
    let st = Arc::new(state());
    let other = send(&st, r#"{"type":"start_session","activity":"bridge"}"#).await;
    let other_id = other["session"]["id"].as_str().unwrap().to_string();

    let mut conn = Connection::new(st.clone());
    let mut started = Vec::new();
    for raw in [
      r#"{"type":"start_session","activity":"matching"}"#,
      r#"{"type":"start_session","activity":"sequencing"}"#,
      r#"{"type":"start_session","activity":"arithmetic","grade":"3"}"#,
    ] {
      let msg: ClientWsMessage = serde_json::from_str(raw).unwrap();
      let v = serde_json::to_value(conn.handle(msg).await).unwrap();
      started.push(v["session"]["id"].as_str().unwrap().to_string());
    }
    let end: ClientWsMessage = serde_json::from_value(serde_json::json!({ "type": "end_session", "session_id": started[0] })).unwrap();
    conn.handle(end).await;
    let peek: ClientWsMessage = serde_json::from_value(serde_json::json!({
      "type": "action", "session_id": other_id, "action": { "type": "check" }
    }))
    .unwrap();
    conn.handle(peek).await;
    assert_eq!(st.sessions.read().await.len(), 3);

    assert_eq!(conn.close().await, 2);
    let sessions = st.sessions.read().await;
    assert_eq!(sessions.len(), 1);
    assert!(sessions.contains_key(&other_id));
  }
}
