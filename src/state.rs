//! Application state: content stores, the daily tracker, live game sessions and the
//! optional dictionary client.
//!
//! This module owns:
//!   - the validated template catalog (via the tracker) and the question bank
//!   - the progress store behind the tracker
//!   - live game sessions by id
//!   - the clock used for "today"

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use crate::catalog::{Catalog, QuestionBank};
use crate::config::{load_app_config_from_env, AppConfig};
use crate::dictionary::DictionaryClient;
use crate::domain::{Language, LanguagePair};
use crate::seeds::{seed_language_pairs, seed_languages, seed_vocabulary};
use crate::session::GameSession;
use crate::store::{JsonFileStore, MemoryStore, ProgressStore};
use crate::tracker::ChallengeTracker;

/// Source of "now". The engine never reads time itself; state hands it a date.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct AppState {
  /// Shared so blocking store work can move onto the blocking pool.
  pub tracker: Arc<ChallengeTracker>,
  pub bank: QuestionBank,
  pub languages: Vec<Language>,
  pub language_pairs: Vec<LanguagePair>,
  pub sessions: Arc<RwLock<HashMap<String, GameSession>>>,
  pub dictionary: Option<DictionaryClient>,
  session_idle: Duration,
  max_sessions: usize,
  clock: Clock,
}

impl AppState {
  /// Build state from env: load config, pick the catalog and store, init the dictionary client.
  #[instrument(level = "info", skip_all)]
  pub fn new() -> Self {
    let cfg = load_app_config_from_env().unwrap_or_default();

    let store_path = std::env::var("STORE_PATH").ok().or_else(|| cfg.store_path.clone());
    let store: Arc<dyn ProgressStore> = match store_path {
      Some(path) => match JsonFileStore::open(&path) {
        Ok(s) => Arc::new(s),
        Err(e) => {
          error!(target: "vocab_backend", %path, error = %e, "Cannot open progress file; falling back to memory");
          Arc::new(MemoryStore::new())
        }
      },
      None => {
        info!(target: "vocab_backend", "No STORE_PATH; progress kept in memory");
        Arc::new(MemoryStore::new())
      }
    };

    let dictionary = DictionaryClient::from_env();
    if let Some(d) = &dictionary {
      info!(target: "vocab_backend", dictionary = %d.dictionary_base_url, translate = %d.translate_base_url, "Dictionary enabled.");
    } else {
      info!(target: "vocab_backend", "Dictionary disabled (DICTIONARY_DISABLED set).");
    }

    Self::from_parts(cfg, store, dictionary, Arc::new(Utc::now))
  }

  /// Assemble state from explicit parts; `new` is this plus env lookups.
  pub fn from_parts(
    cfg: AppConfig,
    store: Arc<dyn ProgressStore>,
    dictionary: Option<DictionaryClient>,
    clock: Clock,
  ) -> Self {
    let catalog = if cfg.templates.is_empty() {
      None
    } else {
      match Catalog::new(cfg.templates) {
        Ok(c) => Some(c),
        Err(e) => {
          error!(target: "challenge", error = %e, "Configured templates rejected; using built-in catalog");
          None
        }
      }
    };
    let catalog = catalog.unwrap_or_else(Catalog::builtin);
    info!(target: "challenge", templates = catalog.len(), "Challenge catalog ready");

    let mut bank = QuestionBank::new(seed_vocabulary());
    for set in cfg.vocabulary {
      bank.extend(set);
    }
    for pair in seed_language_pairs() {
      if bank.questions_for(&pair.id).is_empty() {
        warn!(target: "vocab_backend", pair = %pair.id, "Language pair has no questions");
      }
    }

    let session_idle = Duration::minutes(i64::from(cfg.session_idle_minutes.max(1)));
    let max_sessions = cfg.max_sessions.max(1);

    Self {
      tracker: Arc::new(ChallengeTracker::new(catalog, store)),
      bank,
      languages: seed_languages(),
      language_pairs: seed_language_pairs(),
      sessions: Arc::new(RwLock::new(HashMap::new())),
      dictionary,
      session_idle,
      max_sessions,
      clock,
    }
  }

  pub fn now(&self) -> DateTime<Utc> {
    (self.clock)()
  }

  /// Calendar day the daily set is keyed on (UTC).
  pub fn today(&self) -> NaiveDate {
    self.now().date_naive()
  }

  pub fn is_known_pair(&self, pair: &str) -> bool {
    self.language_pairs.iter().any(|p| p.id == pair) || !self.bank.questions_for(pair).is_empty()
  }

  #[instrument(level = "debug", skip(self, session), fields(id = %session.id))]
  pub async fn insert_session(&self, session: GameSession) {
    self.sessions.write().await.insert(session.id.clone(), session);
  }

  pub async fn remove_session(&self, id: &str) -> Option<GameSession> {
    self.sessions.write().await.remove(id)
  }

  /// Make room for one more session: drop sessions from earlier days or idle past
  /// the TTL, then evict the least recently active until under the cap.
  #[instrument(level = "debug", skip(self))]
  pub async fn prune_sessions(&self, now: DateTime<Utc>) -> usize {
    let today = now.date_naive();
    let mut sessions = self.sessions.write().await;
    let before = sessions.len();
    sessions.retain(|_, s| s.date >= today && s.idle_for(now) < self.session_idle);

    let overflow = (sessions.len() + 1).saturating_sub(self.max_sessions);
    if overflow > 0 {
      let mut by_age: Vec<(DateTime<Utc>, String)> =
        sessions.values().map(|s| (s.last_active, s.id.clone())).collect();
      by_age.sort_unstable();
      for (_, id) in by_age.into_iter().take(overflow) {
        sessions.remove(&id);
      }
      warn!(target: "vocab_backend", overflow, cap = self.max_sessions, "Live session cap reached; evicted oldest");
    }

    let removed = before - sessions.len();
    if removed > 0 {
      info!(target: "vocab_backend", removed, live = sessions.len(), "Pruned stale game sessions");
    }
    removed
  }
}
