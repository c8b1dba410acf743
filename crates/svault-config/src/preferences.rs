use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use svault_error::{Result, SaverError};

pub const SOURCE_HANDLE_KEY: &str = "sourceHandle";

/// Small key-value persistence owned by the host.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// `None` removes the key.
    fn set(&self, key: &str, value: Option<&str>) -> Result<()>;

    /// The user's chosen source: a directory path or a tree-grant handle.
    fn source_handle(&self) -> Option<String> {
        self.get(SOURCE_HANDLE_KEY)
    }

    fn set_source_handle(&self, value: Option<&str>) -> Result<()> {
        self.set(SOURCE_HANDLE_KEY, value)
    }
}

#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: Option<&str>) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        match value {
            Some(value) => values.insert(key.to_string(), value.to_string()),
            None => values.remove(key),
        };
        Ok(())
    }
}

/// A JSON object on disk, read once and cached.
#[derive(Debug)]
pub struct JsonPreferences {
    path: PathBuf,
    cache: Mutex<Option<BTreeMap<String, String>>>,
}

impl JsonPreferences {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> BTreeMap<String, String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                svault_logger::warn(&format!(
                    "Ignoring unreadable preferences {}: {e}",
                    self.path.display()
                ));
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        }
    }

    fn store(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| SaverError::io(parent, e))?;
        }
        let content = serde_json::to_string_pretty(values).map_err(|e| {
            SaverError::io(&self.path, io::Error::new(io::ErrorKind::InvalidData, e))
        })?;
        fs::write(&self.path, content).map_err(|e| SaverError::io(&self.path, e))
    }
}

impl PreferenceStore for JsonPreferences {
    fn get(&self, key: &str) -> Option<String> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.get_or_insert_with(|| self.load()).get(key).cloned()
    }

    fn set(&self, key: &str, value: Option<&str>) -> Result<()> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let values = cache.get_or_insert_with(|| self.load());
        match value {
            Some(value) => values.insert(key.to_string(), value.to_string()),
            None => values.remove(key),
        };
        self.store(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_the_source_handle() {
        let prefs = MemoryPreferences::default();
        assert_eq!(prefs.source_handle(), None);
        prefs.set_source_handle(Some("content://tree/x")).unwrap();
        assert_eq!(prefs.source_handle().as_deref(), Some("content://tree/x"));
        prefs.set_source_handle(None).unwrap();
        assert_eq!(prefs.source_handle(), None);
    }

    #[test]
    fn json_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs").join("preferences.json");

        let first = JsonPreferences::new(&path);
        first.set_source_handle(Some("/storage/emulated/0/WhatsApp/Media/.Statuses")).unwrap();
        first.set("theme", Some("dark")).unwrap();

        let second = JsonPreferences::new(&path);
        assert_eq!(
            second.source_handle().as_deref(),
            Some("/storage/emulated/0/WhatsApp/Media/.Statuses")
        );
        assert_eq!(second.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn corrupt_json_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "[1, 2").unwrap();
        let prefs = JsonPreferences::new(&path);
        assert_eq!(prefs.source_handle(), None);
        prefs.set_source_handle(Some("/x")).unwrap();
        assert_eq!(JsonPreferences::new(&path).source_handle().as_deref(), Some("/x"));
    }
}
