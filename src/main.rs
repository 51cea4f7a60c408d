//! Vocab quiz backend: daily challenges and quiz sessions for a language-learning app.
//!
//! - Axum HTTP + WebSocket API
//! - Deterministic daily challenge sets (one easy, one medium, one hard per day)
//! - Optional dictionary/translation lookups (dictionaryapi.dev + MyMemory)
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   APP_CONFIG_PATH     : path to TOML config (template catalog + extra vocabulary)
//!   STORE_PATH          : JSON file for player progress (memory when unset)
//!   DICTIONARY_DISABLED : "1" turns off remote lookups
//!   DICTIONARY_BASE_URL : default "https://api.dictionaryapi.dev/api/v2"
//!   TRANSLATE_BASE_URL  : default "https://api.mymemory.translated.net"
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod seeds;
mod catalog;
mod challenges;
mod store;
mod tracker;
mod session;
mod state;
mod protocol;
mod logic;
mod dictionary;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (catalog, question bank, progress store, dictionary).
  let state = Arc::new(AppState::new());

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "vocab_backend", %addr, today = %state.today(), "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      let _ = tokio::signal::ctrl_c().await;
      info!(target: "vocab_backend", "Shutdown signal received");
    })
    .await?;
  Ok(())
}
