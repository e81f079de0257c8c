//! Persistence: an opaque byte-oriented key-value store plus the JSON layer
//! every service writes through.
//!
//! Each entity lives under its own key and is written in full after every
//! mutation. Decode failures degrade to defaults and write failures are only
//! logged; the in-memory state stays authoritative for the session.

mod config;
pub mod database;
mod memory;

pub use config::{Config, FocusConfig, LoggingConfig, NotificationsConfig, ReminderTime, WeeklyReminder};
pub use database::Database;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

use crate::error::StorageError;

/// Keys under which each entity is stored.
pub mod keys {
    pub const PRIORITIES: &str = "priorities";
    pub const WEEKLY_STATS: &str = "weekly_stats";
    pub const FOCUS_STATS: &str = "focus_stats";
    pub const FOCUS_TIMER: &str = "focus_timer";
    pub const GAMIFICATION: &str = "gamification";
    pub const DAILY_CHECKINS: &str = "daily_checkins";
}

/// Get/set-by-key byte store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
}

/// Read and decode `key`.
///
/// Returns `None` when the key was never written, when the read fails or
/// when the stored bytes do not decode as `T`. Failures are logged.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let bytes = match store.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(e) => {
            tracing::error!(key, error = %e, "failed to read from store");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "stored value does not decode, using default");
            None
        }
    }
}

/// Encode `value` and write it under `key`. Failures are logged only.
pub fn save_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let bytes = match serde_json::to_vec(value) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(key, error = %e, "failed to encode value");
            return;
        }
    };
    if let Err(e) = store.set(key, &bytes) {
        tracing::error!(key, error = %e, "failed to write to store");
    }
}

/// Returns the data directory.
///
/// `WEEKFOCUS_DATA_DIR` wins when set; otherwise `~/.config/weekfocus[-dev]/`
/// based on `WEEKFOCUS_ENV`. The directory is created if missing.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("WEEKFOCUS_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("WEEKFOCUS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("weekfocus-dev")
            } else {
                base_dir.join("weekfocus")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| StorageError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
