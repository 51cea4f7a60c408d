//! Per-player daily challenge progress.
//!
//! The tracker is the caller the engine expects: it stamps today's set once,
//! re-evaluates a challenge after every answer, writes the clamped value back and
//! persists the set through the `ProgressStore` port.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::catalog::Catalog;
use crate::challenges::{evaluate_progress, generate_daily_set, update_challenge_progress};
use crate::domain::{Challenge, DailyChallengeSet, GameSessionStats};
use crate::store::{ProgressStore, StoreError};

#[derive(Debug, Error)]
pub enum TrackerError {
  #[error(transparent)]
  Store(#[from] StoreError),
  #[error("serialize daily set: {0}")]
  Encode(#[from] serde_json::Error),
  #[error("unknown challenge: {0}")]
  UnknownChallenge(String),
}

/// Result of re-evaluating one challenge.
#[derive(Clone, Debug)]
pub struct ProgressUpdate {
  pub challenge: Challenge,
  /// This evaluation pushed the challenge over its target.
  pub newly_completed: bool,
  /// This evaluation finished the whole day's set.
  pub set_completed: bool,
  pub streak_day: u32,
}

pub struct ChallengeTracker {
  catalog: Catalog,
  store: Arc<dyn ProgressStore>,
  // load → mutate → save must not interleave between sessions of one player.
  // Holds the latest date expired sets were swept for.
  write_lock: Mutex<Option<NaiveDate>>,
}

fn daily_key(player: &str, date: NaiveDate) -> String {
  format!("daily:{}:{}", player, date.format("%Y-%m-%d"))
}

fn daily_key_date(key: &str) -> Option<NaiveDate> {
  let (_, date) = key.strip_prefix("daily:")?.rsplit_once(':')?;
  NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

impl ChallengeTracker {
  pub fn new(catalog: Catalog, store: Arc<dyn ProgressStore>) -> Self {
    Self { catalog, store, write_lock: Mutex::new(None) }
  }

  pub fn catalog(&self) -> &Catalog {
    &self.catalog
  }

  fn load_set(&self, player: &str, date: NaiveDate) -> Result<Option<DailyChallengeSet>, TrackerError> {
    let key = daily_key(player, date);
    let Some(raw) = self.store.load(&key)? else {
      return Ok(None);
    };
    match serde_json::from_value::<DailyChallengeSet>(raw.clone()) {
      Ok(set) => Ok(Some(set)),
      Err(e) => {
        // keep the unreadable value; the fresh set is about to take its key
        let backup = format!("corrupt:{}", key);
        self.store.save(&backup, raw)?;
        error!(target: "challenge", %player, %date, %backup, error = %e, "Stored daily set unreadable; backed up and regenerating");
        Ok(None)
      }
    }
  }

  /// Only today's and yesterday's sets are ever read; drop older days once per new date.
  fn sweep_expired(&self, swept: &mut Option<NaiveDate>, date: NaiveDate) -> Result<(), TrackerError> {
    if matches!(*swept, Some(d) if d >= date) {
      return Ok(());
    }
    let Some(oldest_kept) = date.pred_opt() else {
      return Ok(());
    };
    let removed = self.store.retain(&|key: &str| daily_key_date(key).map_or(true, |d| d >= oldest_kept))?;
    *swept = Some(date);
    if removed > 0 {
      info!(target: "challenge", %date, removed, "Swept expired daily sets");
    }
    Ok(())
  }

  fn save_set(&self, player: &str, set: &DailyChallengeSet) -> Result<(), TrackerError> {
    self.store.save(&daily_key(player, set.date), serde_json::to_value(set)?)?;
    Ok(())
  }

  fn today_locked(&self, player: &str, date: NaiveDate) -> Result<DailyChallengeSet, TrackerError> {
    if let Some(set) = self.load_set(player, date)? {
      return Ok(set);
    }
    // Streak carries over only from a fully completed yesterday.
    let streak_day = match date.pred_opt() {
      Some(prev) => self.load_set(player, prev)?.filter(|s| s.completed).map(|s| s.streak_day).unwrap_or(0),
      None => 0,
    };
    let set = DailyChallengeSet {
      date,
      challenges: generate_daily_set(date, &self.catalog),
      streak_day,
      completed: false,
    };
    self.save_set(player, &set)?;
    info!(target: "challenge", %player, %date, streak_day, "Stamped daily challenge set");
    Ok(set)
  }

  /// The player's set for `date`, stamping and saving it on first access.
  #[instrument(level = "debug", skip(self))]
  pub fn today(&self, player: &str, date: NaiveDate) -> Result<DailyChallengeSet, TrackerError> {
    let mut swept = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
    self.sweep_expired(&mut swept, date)?;
    self.today_locked(player, date)
  }

  /// Re-evaluate one of the day's challenges against a session snapshot and persist it.
  #[instrument(level = "debug", skip(self, stats), fields(answered = stats.questions_answered))]
  pub fn record(
    &self,
    player: &str,
    date: NaiveDate,
    challenge_id: &str,
    stats: &GameSessionStats,
  ) -> Result<ProgressUpdate, TrackerError> {
    let mut swept = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
    self.sweep_expired(&mut swept, date)?;
    let mut set = self.today_locked(player, date)?;
    let unknown = || TrackerError::UnknownChallenge(challenge_id.to_string());
    let raw = set
      .challenges
      .iter()
      .find(|c| c.id == challenge_id)
      .map(|c| evaluate_progress(c, stats))
      .ok_or_else(unknown)?;
    let newly_completed = update_challenge_progress(&mut set.challenges, challenge_id, raw);
    let challenge = set.challenges.iter().find(|c| c.id == challenge_id).cloned().ok_or_else(unknown)?;
    if newly_completed {
      info!(target: "challenge", %player, id = %challenge.id, kind = challenge.rule().kind(), title = %challenge.template.title, xp = challenge.template.reward.xp, "Challenge completed");
    }

    let set_completed = !set.completed && set.challenges.iter().all(|c| c.completed);
    if set_completed {
      set.completed = true;
      set.streak_day += 1;
      info!(target: "challenge", %player, %date, streak_day = set.streak_day, "Daily set completed");
    }
    self.save_set(player, &set)?;

    Ok(ProgressUpdate { challenge, newly_completed, set_completed, streak_day: set.streak_day })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::seed_templates;
  use crate::store::MemoryStore;

  fn tracker() -> ChallengeTracker {
    ChallengeTracker::new(Catalog::new(seed_templates()).unwrap(), Arc::new(MemoryStore::new()))
  }

  fn perfect(n: u32) -> GameSessionStats {
    let mut s = GameSessionStats::for_pair("en-es");
    for _ in 0..n {
      s.record_answer(true, "Animals", "en-es");
    }
    s
  }

  fn complete_all(t: &ChallengeTracker, player: &str, date: NaiveDate) -> ProgressUpdate {
    let mut s = perfect(30);
    s.language_pairs_played.extend(["en-fr".to_string(), "en-de".to_string()]);
    let set = t.today(player, date).unwrap();
    let mut last = None;
    for c in &set.challenges {
      last = Some(t.record(player, date, &c.id, &s).unwrap());
    }
    last.unwrap()
  }

  #[test]
  fn today_is_stable_across_calls() {
    let t = tracker();
    let d = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let a = t.today("guest", d).unwrap();
    let b = t.today("guest", d).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.streak_day, 0);
  }

  #[test]
  fn record_persists_and_reports_completion_once() {
    let t = tracker();
    let d = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    // easy slot on 2025-01-01 is "Perfect Start" (streak of 3)
    let first = t.record("guest", d, "daily-2025-01-01-0", &perfect(2)).unwrap();
    assert_eq!(first.challenge.progress, 2);
    assert!(!first.newly_completed);
    let second = t.record("guest", d, "daily-2025-01-01-0", &perfect(4)).unwrap();
    assert_eq!(second.challenge.progress, 3);
    assert!(second.newly_completed);
    let third = t.record("guest", d, "daily-2025-01-01-0", &perfect(5)).unwrap();
    assert!(!third.newly_completed);
    assert!(t.today("guest", d).unwrap().challenges[0].completed);
  }

  #[test]
  fn unknown_challenge_is_an_error() {
    let t = tracker();
    let d = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    assert!(matches!(t.record("guest", d, "daily-1999-01-01-0", &perfect(1)), Err(TrackerError::UnknownChallenge(_))));
  }

  #[test]
  fn streak_day_carries_from_completed_yesterday() {
    let t = tracker();
    let d1 = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let d2 = d1.succ_opt().unwrap();
    let done = complete_all(&t, "ana", d1);
    assert!(done.set_completed);
    assert_eq!(done.streak_day, 1);
    assert_eq!(t.today("ana", d2).unwrap().streak_day, 1);
    assert_eq!(complete_all(&t, "ana", d2).streak_day, 2);
    // other players are unaffected
    assert_eq!(t.today("bo", d2).unwrap().streak_day, 0);
  }

  #[test]
  fn sets_older_than_yesterday_are_swept() {
    let store = Arc::new(MemoryStore::new());
    let t = ChallengeTracker::new(Catalog::builtin(), store.clone());
    let d1 = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let d2 = d1.succ_opt().unwrap();
    let d3 = d2.succ_opt().unwrap();
    t.today("ana", d1).unwrap();
    t.today("bo", d1).unwrap();
    t.today("ana", d2).unwrap();
    store.save("corrupt:daily:ana:2024-12-01", serde_json::json!(null)).unwrap();

    t.today("ana", d3).unwrap();
    assert!(store.load(&daily_key("ana", d1)).unwrap().is_none());
    assert!(store.load(&daily_key("bo", d1)).unwrap().is_none());
    assert!(store.load(&daily_key("ana", d2)).unwrap().is_some());
    assert!(store.load(&daily_key("ana", d3)).unwrap().is_some());
    // only daily set keys are swept
    assert!(store.load("corrupt:daily:ana:2024-12-01").unwrap().is_some());
  }

  #[test]
  fn unreadable_set_is_backed_up_before_regenerating() {
    let store = Arc::new(MemoryStore::new());
    let t = ChallengeTracker::new(Catalog::builtin(), store.clone());
    let d = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let garbage = serde_json::json!({ "streakDay": "seven" });
    store.save(&daily_key("ana", d), garbage.clone()).unwrap();

    let set = t.today("ana", d).unwrap();
    assert_eq!(set.challenges.len(), 3);
    assert_eq!(store.load("corrupt:daily:ana:2025-01-01").unwrap(), Some(garbage));
  }

  #[test]
  fn daily_keys_parse_back_to_their_date() {
    let d = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
    assert_eq!(daily_key_date(&daily_key("a.b@c", d)), Some(d));
    assert_eq!(daily_key_date("corrupt:daily:a:2025-03-09"), None);
    assert_eq!(daily_key_date("daily:a:soon"), None);
  }
}
