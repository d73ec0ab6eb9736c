//! STEM Quest · Learning Platform Backend
//!
//! - Axum HTTP + WebSocket API for the subject quiz and the four mini-games
//! - Hosted backend-as-a-service access, or demo mode when not configured
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   APP_CONFIG_PATH   : path to TOML config (quiz/drill tuning + extra questions)
//!   SUPABASE_URL      : hosted backend base URL; with the key below, disables demo mode
//!   SUPABASE_ANON_KEY : hosted backend public API key
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod seeds;
mod bank;
mod i18n;
mod games;
mod quiz;
mod session;
mod backend;
mod accounts;
mod dashboard;
mod error;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared state: config, question bank, backend strategy, session store.
  let state = Arc::new(AppState::new());
  // Drops sessions abandoned by HTTP-only clients.
  let _sweeper = state.spawn_session_sweeper();

  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "stem_quest", %addr, demo = state.backend.is_demo(), "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
