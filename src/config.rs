//! Loading app configuration (template catalog override + extra vocabulary) from TOML.
//!
//! Example:
//!
//! ```toml
//! store_path = "data/progress.json"
//! session_idle_minutes = 30
//! max_sessions = 10000
//!
//! [[templates]]
//! title = "Quick Fire"
//! description = "Answer 5 questions correctly in under 30 seconds"
//! type = "speed"
//! timeLimit = 30
//! difficulty = "easy"
//! target = 5
//! reward = { xp = 50, badge = "⚡" }
//!
//! [[vocabulary]]
//! languagePairId = "en-it"
//! questions = [ ... ]
//! ```

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{ChallengeTemplate, VocabularySet};

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
  /// Replaces the built-in catalog when non-empty.
  #[serde(default)]
  pub templates: Vec<ChallengeTemplate>,
  /// Appended to the built-in question bank.
  #[serde(default)]
  pub vocabulary: Vec<VocabularySet>,
  /// JSON file for player progress; in-memory when absent. STORE_PATH wins over this.
  #[serde(default)]
  pub store_path: Option<String>,
  /// Live sessions untouched for this long are dropped.
  #[serde(default = "default_session_idle_minutes")]
  pub session_idle_minutes: u32,
  /// Upper bound on live sessions; the least recently active go first.
  #[serde(default = "default_max_sessions")]
  pub max_sessions: usize,
}

fn default_session_idle_minutes() -> u32 {
  30
}

fn default_max_sessions() -> usize {
  10_000
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      templates: Vec::new(),
      vocabulary: Vec::new(),
      store_path: None,
      session_idle_minutes: default_session_idle_minutes(),
      max_sessions: default_max_sessions(),
    }
  }
}

pub fn parse_app_config(raw: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(raw)
}

/// Attempt to load `AppConfig` from APP_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("APP_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_app_config(&s) {
      Ok(cfg) => {
        info!(target: "vocab_backend", %path, templates = cfg.templates.len(), vocabulary_sets = cfg.vocabulary.len(), "Loaded app config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "vocab_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "vocab_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
