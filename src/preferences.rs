use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed preferences: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct DisplayPreferences {
    #[serde(default)]
    pub dark_mode: bool,
}

pub trait PreferenceStore: Send + Sync {
    fn load(&self) -> Result<DisplayPreferences, PreferenceError>;
    fn save(&self, prefs: &DisplayPreferences) -> Result<(), PreferenceError>;
}

/// Keeps preferences as a small JSON document on disk.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Result<DisplayPreferences, PreferenceError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(DisplayPreferences::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, prefs: &DisplayPreferences) -> Result<(), PreferenceError> {
        let body = serde_json::to_string_pretty(prefs)?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    value: Mutex<Option<DisplayPreferences>>,
}

impl MemoryPreferenceStore {
    pub fn new(initial: DisplayPreferences) -> Self {
        Self {
            value: Mutex::new(Some(initial)),
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Result<DisplayPreferences, PreferenceError> {
        let value = self.value.lock().unwrap_or_else(|e| e.into_inner());
        Ok(value.unwrap_or_default())
    }

    fn save(&self, prefs: &DisplayPreferences) -> Result<(), PreferenceError> {
        let mut value = self.value.lock().unwrap_or_else(|e| e.into_inner());
        *value = Some(*prefs);
        Ok(())
    }
}

/// The display preferences read at startup, written through the store on
/// every change.
pub struct Preferences {
    store: Arc<dyn PreferenceStore>,
    current: Mutex<DisplayPreferences>,
}

impl Preferences {
    pub fn load(store: Arc<dyn PreferenceStore>) -> Result<Self, PreferenceError> {
        let initial = store.load()?;
        Ok(Self::with_value(store, initial))
    }

    pub fn with_value(store: Arc<dyn PreferenceStore>, initial: DisplayPreferences) -> Self {
        Self {
            store,
            current: Mutex::new(initial),
        }
    }

    pub fn current(&self) -> DisplayPreferences {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_dark_mode(&self, dark_mode: bool) -> Result<DisplayPreferences, PreferenceError> {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        let next = DisplayPreferences { dark_mode };
        self.store.save(&next)?;
        *current = next;
        info!(dark_mode, "display preferences saved");
        Ok(next)
    }

    pub fn toggle_dark_mode(&self) -> Result<DisplayPreferences, PreferenceError> {
        let dark_mode = !self.current().dark_mode;
        self.set_dark_mode(dark_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_defaults_to_light() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("prefs.json"));
        assert_eq!(store.load().unwrap(), DisplayPreferences { dark_mode: false });
    }

    #[test]
    fn test_file_store_persists_dark_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        FilePreferenceStore::new(&path)
            .save(&DisplayPreferences { dark_mode: true })
            .unwrap();

        let reopened = FilePreferenceStore::new(&path);
        assert!(reopened.load().unwrap().dark_mode);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            FilePreferenceStore::new(&path).load(),
            Err(PreferenceError::Format(_))
        ));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryPreferenceStore::default();
        assert!(!store.load().unwrap().dark_mode);
        store.save(&DisplayPreferences { dark_mode: true }).unwrap();
        assert!(store.load().unwrap().dark_mode);
    }

    #[test]
    fn test_toggle_writes_through() {
        let store = Arc::new(MemoryPreferenceStore::default());
        let prefs = Preferences::load(store.clone()).unwrap();
        assert!(!prefs.current().dark_mode);

        assert!(prefs.toggle_dark_mode().unwrap().dark_mode);
        assert!(store.load().unwrap().dark_mode);

        assert!(!prefs.toggle_dark_mode().unwrap().dark_mode);
        assert!(!store.load().unwrap().dark_mode);
    }

    #[test]
    fn test_failed_save_keeps_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("missing").join("prefs.json"));
        let prefs = Preferences::with_value(Arc::new(store), DisplayPreferences::default());

        assert!(matches!(prefs.set_dark_mode(true), Err(PreferenceError::Io(_))));
        assert!(!prefs.current().dark_mode);
    }
}
