//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! Behavior:
//! - LOG_LEVEL controls the filter (e.g. "debug" or detailed directives like
//!   "info,quiz=debug,game=trace,tower_http=info").
//! - LOG_FORMAT selects "pretty" (default) or "json" structured logs. JSON
//!   lines carry the event fields at top level plus the current span.
//!
//! Targets: `stem_quest` (lifecycle, backend), `quiz`, `game`, `auth`.
//! Tower HTTP TraceLayer adds per-request spans on top.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,quiz=debug,game=debug,stem_quest=debug,auth=debug,tower_http=info,axum=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn from_setting(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let format = LogFormat::from_setting(std::env::var("LOG_FORMAT").ok().as_deref());
    match format {
        LogFormat::Json => {
            builder.json().flatten_event(true).with_current_span(true).init();
        }
        LogFormat::Pretty => {
            builder.init();
        }
    }
    tracing::debug!(target: "stem_quest", ?format, "Tracing initialized");
}
