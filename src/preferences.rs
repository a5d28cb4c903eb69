//! Persistence for [`PlayerPreferences`].
//!
//! Preferences are the only player state that survives a reload. They are kept
//! under a single namespaced key as plain JSON. Nothing here may block player
//! usage: a missing, unreadable or corrupt entry yields the defaults.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::PlayerError;
use crate::models::PlayerPreferences;

/// Interface for preference persistence.
pub trait PreferenceStore: Send + Sync {
    /// Loads stored preferences. `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<PlayerPreferences>, PlayerError>;

    /// Persists the full preference set.
    fn save(&self, prefs: &PlayerPreferences) -> Result<(), PlayerError>;
}

/// Loads preferences, falling back to defaults on any failure.
pub fn load_or_default(store: &dyn PreferenceStore) -> PlayerPreferences {
    match store.load() {
        Ok(Some(prefs)) => {
            debug!(?prefs, "Loaded stored player preferences");
            prefs
        }
        Ok(None) => PlayerPreferences::default(),
        Err(e) => {
            warn!(error = %e, "Preference load failed, using defaults");
            PlayerPreferences::default()
        }
    }
}

/// Stores preferences as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        Self {
            path: dir.as_ref().join(format!("{file_name}.json")),
        }
    }

    /// Store under `dir` keyed by [`Config::storage_key`].
    pub fn from_config(dir: impl AsRef<Path>, config: &Config) -> Self {
        Self::new(dir, &config.storage_key)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Result<Option<PlayerPreferences>, PlayerError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PlayerError::PreferenceLoad(e.to_string())),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| PlayerError::PreferenceLoad(e.to_string()))
    }

    fn save(&self, prefs: &PlayerPreferences) -> Result<(), PlayerError> {
        let json = serde_json::to_string(prefs)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Write-then-rename so a crash mid-write never leaves a torn file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "Saved player preferences");
        Ok(())
    }
}

/// In-process store holding the raw JSON string, like a browser storage slot.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    slot: Mutex<Option<String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the slot with an arbitrary (possibly corrupt) payload.
    pub fn with_raw(raw: &str) -> Self {
        Self {
            slot: Mutex::new(Some(raw.to_string())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Result<Option<PlayerPreferences>, PlayerError> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| PlayerError::PreferenceLoad("storage lock poisoned".to_string()))?;
        match slot.as_deref() {
            None => Ok(None),
            Some(raw) => serde_json::from_str(raw)
                .map(Some)
                .map_err(|e| PlayerError::PreferenceLoad(e.to_string())),
        }
    }

    fn save(&self, prefs: &PlayerPreferences) -> Result<(), PlayerError> {
        let json = serde_json::to_string(prefs)?;
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| PlayerError::PreferenceSave("storage lock poisoned".to_string()))?;
        *slot = Some(json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DefaultSize, PauseBehavior};

    #[test]
    fn corrupt_payload_falls_back_to_defaults() {
        let store = MemoryPreferenceStore::with_raw("{not json");
        assert!(store.load().is_err());
        assert_eq!(load_or_default(&store), PlayerPreferences::default());
    }

    #[test]
    fn memory_store_keeps_plain_json() {
        let store = MemoryPreferenceStore::new();
        let prefs = PlayerPreferences {
            pause_behavior: PauseBehavior::NeverPause,
            default_size: DefaultSize::Expanded,
            auto_play_next: false,
        };
        store.save(&prefs).unwrap();
        assert_eq!(
            store.raw().as_deref(),
            Some(r#"{"pauseBehavior":"neverPause","defaultSize":"expanded","autoPlayNext":false}"#)
        );
        assert_eq!(load_or_default(&store), prefs);
    }

    #[test]
    fn file_name_is_sanitized() {
        let store = FilePreferenceStore::new("/tmp/x", "floating-player:prefs/v1");
        assert_eq!(
            store.path(),
            Path::new("/tmp/x/floating-player_prefs_v1.json")
        );
    }
}
