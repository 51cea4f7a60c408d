//! Key/value persistence port for caller-side progress (daily sets, streaks).
//!
//! The challenge engine never sees this; only the tracker does.

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
  sync::RwLock,
};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, instrument};

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("store IO error: {0}")]
  Io(#[from] std::io::Error),
  #[error("store JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Blocking key/value store. Async callers run it on the blocking pool.
pub trait ProgressStore: Send + Sync {
  fn load(&self, key: &str) -> StoreResult<Option<Value>>;
  fn save(&self, key: &str, value: Value) -> StoreResult<()>;
  /// Drop every entry whose key fails `keep`; returns how many went.
  fn retain(&self, keep: &dyn Fn(&str) -> bool) -> StoreResult<usize>;
}

/// Process-local store. Lost on restart.
#[derive(Default)]
pub struct MemoryStore {
  entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl ProgressStore for MemoryStore {
  fn load(&self, key: &str) -> StoreResult<Option<Value>> {
    let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
    Ok(entries.get(key).cloned())
  }

  fn save(&self, key: &str, value: Value) -> StoreResult<()> {
    let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
    entries.insert(key.to_string(), value);
    Ok(())
  }

  fn retain(&self, keep: &dyn Fn(&str) -> bool) -> StoreResult<usize> {
    let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
    let before = entries.len();
    entries.retain(|k, _| keep(k));
    Ok(before - entries.len())
  }
}

/// Single JSON object on disk, rewritten after every save.
pub struct JsonFileStore {
  path: PathBuf,
  entries: RwLock<HashMap<String, Value>>,
}

impl JsonFileStore {
  /// Open `path`, starting empty if the file does not exist yet.
  #[instrument(level = "info", skip_all)]
  pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
    let path = path.as_ref().to_path_buf();
    let entries = if path.exists() {
      let raw = std::fs::read_to_string(&path)?;
      if raw.trim().is_empty() { HashMap::new() } else { serde_json::from_str(&raw)? }
    } else {
      HashMap::new()
    };
    info!(target: "vocab_backend", path = %path.display(), keys = entries.len(), "Progress store opened");
    Ok(Self { path, entries: RwLock::new(entries) })
  }

  fn flush(&self, entries: &HashMap<String, Value>) -> StoreResult<()> {
    if let Some(dir) = self.path.parent() {
      if !dir.as_os_str().is_empty() {
        std::fs::create_dir_all(dir)?;
      }
    }
    let tmp = self.path.with_extension("tmp");
    std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
    std::fs::rename(&tmp, &self.path)?;
    Ok(())
  }
}

impl ProgressStore for JsonFileStore {
  fn load(&self, key: &str) -> StoreResult<Option<Value>> {
    let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
    Ok(entries.get(key).cloned())
  }

  fn save(&self, key: &str, value: Value) -> StoreResult<()> {
    let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
    entries.insert(key.to_string(), value);
    self.flush(&entries)?;
    debug!(target: "vocab_backend", %key, "Progress saved to disk");
    Ok(())
  }

  fn retain(&self, keep: &dyn Fn(&str) -> bool) -> StoreResult<usize> {
    let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
    let before = entries.len();
    entries.retain(|k, _| keep(k));
    let removed = before - entries.len();
    if removed > 0 {
      self.flush(&entries)?;
      info!(target: "vocab_backend", removed, keys = entries.len(), "Expired progress entries dropped");
    }
    Ok(removed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn memory_store_round_trip() {
    let s = MemoryStore::new();
    assert!(s.load("k").unwrap().is_none());
    s.save("k", json!({ "a": 1 })).unwrap();
    assert_eq!(s.load("k").unwrap(), Some(json!({ "a": 1 })));
  }

  #[test]
  fn retain_drops_rejected_keys() {
    let s = MemoryStore::new();
    s.save("daily:a:2025-01-01", json!(1)).unwrap();
    s.save("daily:a:2025-01-03", json!(3)).unwrap();
    assert_eq!(s.retain(&|k: &str| k.ends_with("03")).unwrap(), 1);
    assert!(s.load("daily:a:2025-01-01").unwrap().is_none());
    assert!(s.load("daily:a:2025-01-03").unwrap().is_some());
  }

  #[test]
  fn file_store_survives_reopen() {
    let dir = std::env::temp_dir().join(format!("vocab-store-{}", uuid::Uuid::new_v4()));
    let path = dir.join("progress.json");
    {
      let s = JsonFileStore::open(&path).unwrap();
      s.save("daily:guest:2025-01-01", json!({ "streakDay": 2 })).unwrap();
    }
    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.load("daily:guest:2025-01-01").unwrap(), Some(json!({ "streakDay": 2 })));
    assert_eq!(reopened.retain(&|_: &str| false).unwrap(), 1);
    assert!(JsonFileStore::open(&path).unwrap().load("daily:guest:2025-01-01").unwrap().is_none());
    let _ = std::fs::remove_dir_all(&dir);
  }
}
