//! Application state: immutable config and question bank, the backend
//! strategy, and the in-memory play-session store.
//!
//! Everything except the session store is built once at startup and never
//! mutated afterwards.

use std::{collections::HashMap, sync::Arc, time::Duration};
use chrono::{DateTime, Utc};
use tokio::{sync::RwLock, task::JoinHandle};
use tracing::{debug, error, info, instrument};

use crate::backend::BackendClient;
use crate::bank::QuestionBank;
use crate::config::{load_app_config_from_env, AppConfig};
use crate::seeds::BUILTIN_QUESTION_BANK;
use crate::session::Session;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub bank: Arc<QuestionBank>,
    pub backend: BackendClient,
    pub sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl AppState {
    /// Build state from env: load config, build the bank, pick the backend strategy.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let config = load_app_config_from_env().unwrap_or_default();
        Self::with_parts(config, BackendClient::from_env())
    }

    /// Assemble state from an explicit config and backend (used by `new` and tests).
    pub fn with_parts(config: AppConfig, backend: BackendClient) -> Self {
        let bank = match QuestionBank::from_toml(BUILTIN_QUESTION_BANK) {
            Ok(b) => b,
            Err(e) => {
                error!(target: "quiz", error = %e, "Built-in question bank failed to parse; starting with an empty bank");
                QuestionBank::default()
            }
        };
        let bank = bank.with_extra(&config.questions);
        info!(
            target: "stem_quest",
            questions = bank.len(),
            rejected = bank.rejected(),
            demo = backend.is_demo(),
            seconds_per_question = config.quiz.seconds_per_question,
            drill_secs = config.drill.duration_secs,
            "Startup inventory"
        );

        Self {
            config: Arc::new(config),
            bank: Arc::new(bank),
            backend,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[instrument(level = "debug", skip(self, session), fields(id = %session.id))]
    pub async fn insert_session(&self, session: Session) {
        self.sessions.write().await.insert(session.id.clone(), session);
    }

    /// Drop a session. Returns whether it existed.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn remove_session(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Drop every listed session that still exists. Returns how many were removed.
    #[instrument(level = "debug", skip(self, ids))]
    pub async fn remove_sessions<I>(&self, ids: I) -> usize
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut sessions = self.sessions.write().await;
        ids.into_iter().filter(|id| sessions.remove(id.as_ref()).is_some()).count()
    }

    /// Drop sessions with no activity for `idle_timeout_secs`. Returns how many were removed.
    pub async fn evict_idle_sessions(&self, now: DateTime<Utc>) -> usize {
        let secs = u32::try_from(self.config.sessions.idle_timeout_secs).unwrap_or(u32::MAX);
        let max_idle = chrono::Duration::seconds(i64::from(secs));
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_idle(now, max_idle));
        before - sessions.len()
    }

    /// Run `evict_idle_sessions` every `sweep_interval_secs` until the runtime shuts down.
    pub fn spawn_session_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let state = Arc::clone(self);
        let period = Duration::from_secs(state.config.sessions.sweep_interval_secs.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let evicted = state.evict_idle_sessions(Utc::now()).await;
                if evicted > 0 {
                    info!(target: "stem_quest", evicted, "Idle sessions evicted");
                } else {
                    debug!(target: "stem_quest", "Idle session sweep found nothing");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendClient, DemoBackend};
    use crate::logic::start_session;
    use crate::session::{ActivityKind, SessionRequest};

    fn state(idle_timeout_secs: u64) -> AppState {
        let mut config = AppConfig::default();
        config.sessions.idle_timeout_secs = idle_timeout_secs;
        AppState::with_parts(config, BackendClient::Demo(DemoBackend))
    }

    fn request(activity: ActivityKind) -> SessionRequest {
        SessionRequest { activity, subject: None, grade: None, lang: None, user_id: None, activity_id: None }
    }

    async fn session_id(state: &AppState, activity: ActivityKind) -> String {
        let out = start_session(state, request(activity)).await.unwrap();
        out.session["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted_and_active_ones_kept() {
        let st = state(600);
        let stale = session_id(&st, ActivityKind::Bridge).await;
        let fresh = session_id(&st, ActivityKind::Matching).await;
        let now = Utc::now();
        st.sessions.write().await.get_mut(&stale).unwrap().last_active = now - chrono::Duration::seconds(601);

        assert_eq!(st.evict_idle_sessions(now).await, 1);
        let sessions = st.sessions.read().await;
        assert!(!sessions.contains_key(&stale));
        assert!(sessions.contains_key(&fresh));
    }

    #[tokio::test]
    async fn many_abandoned_sessions_do_not_accumulate() {
        let st = state(1800);
        for _ in 0..500 {
            session_id(&st, ActivityKind::Sequencing).await;
        }
        assert_eq!(st.sessions.read().await.len(), 500);
        let later = Utc::now() + chrono::Duration::seconds(1800);
        assert_eq!(st.evict_idle_sessions(later).await, 500);
        assert!(st.sessions.read().await.is_empty());
    }

    #[tokio::test]
    async fn remove_sessions_skips_unknown_ids() {
        let st = state(1800);
        let a = session_id(&st, ActivityKind::Bridge).await;
        let b = session_id(&st, ActivityKind::Bridge).await;
        let keep = session_id(&st, ActivityKind::Bridge).await;
        assert_eq!(st.remove_sessions([a.as_str(), b.as_str(), "missing"]).await, 2);
        let sessions = st.sessions.read().await;
        assert_eq!(sessions.len(), 1);
        assert!(sessions.contains_key(&keep));
    }
}
