//! Persistence for user-defined correction rules.
//!
//! Overrides live as one JSON-encoded `wrong -> correct` map under a single
//! key of a simple key-value store. The parser only ever reads them; writes go
//! through the administrative surface (CLI `rules` command, host settings UI).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::StoreError;

/// Key the override map is stored under unless configured otherwise.
pub const DEFAULT_RULES_KEY: &str = "CustomOCRRules";

/// Minimal string key-value persistence.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store, mainly for tests and embedded hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}

/// A key-value store kept as a JSON object in one file.
///
/// A missing file reads as an empty store; the file (and its parent
/// directory) is created on the first write.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, StoreError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(StoreError::Layout),
        }
    }

    fn write_all(&self, map: Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(&Value::Object(map))?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.read_all()?.remove(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(StoreError::Layout),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.read_all()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.write_all(map)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut map = self.read_all()?;
        if map.remove(key).is_some() {
            self.write_all(map)?;
        }
        Ok(())
    }
}

/// User-defined correction overrides kept in a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct CustomRuleStore<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> CustomRuleStore<S> {
    /// Wrap a store using the default key.
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_RULES_KEY)
    }

    /// Wrap a store using a custom key.
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Load the override map.
    ///
    /// An undecodable stored value loads as an empty map; I/O failures propagate.
    pub fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(BTreeMap::new());
        };

        match serde_json::from_str(&raw) {
            Ok(rules) => Ok(rules),
            Err(e) => {
                warn!("Ignoring undecodable rule map under {}: {}", self.key, e);
                Ok(BTreeMap::new())
            }
        }
    }

    /// Add or replace one override.
    pub fn add(&mut self, wrong: &str, correct: &str) -> Result<(), StoreError> {
        let mut rules = self.load()?;
        rules.insert(wrong.to_string(), correct.to_string());
        debug!("Saving custom rule [{}] -> [{}]", wrong, correct);
        self.save(&rules)
    }

    /// Remove one override. Returns whether it existed.
    pub fn remove(&mut self, wrong: &str) -> Result<bool, StoreError> {
        let mut rules = self.load()?;
        let existed = rules.remove(wrong).is_some();
        if existed {
            self.save(&rules)?;
        }
        Ok(existed)
    }

    /// Remove every override.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store.remove(&self.key)
    }

    fn save(&mut self, rules: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(rules)?;
        self.store.set(&self.key, &encoded)
    }

    /// Get the underlying store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut rules = CustomRuleStore::new(MemoryStore::new());
        assert!(rules.load().unwrap().is_empty());

        rules.add("TTaxiG0", "TaxiGo").unwrap();
        rules.add("Finance 1", "Finance |").unwrap();
        assert_eq!(rules.load().unwrap().len(), 2);

        assert!(rules.remove("TTaxiG0").unwrap());
        assert!(!rules.remove("TTaxiG0").unwrap());

        let loaded = rules.load().unwrap();
        assert_eq!(loaded.get("Finance 1").map(String::as_str), Some("Finance |"));
    }

    #[test]
    fn test_corrupt_value_loads_empty() {
        let mut store = MemoryStore::new();
        store.set(DEFAULT_RULES_KEY, "not json").unwrap();
        let rules = CustomRuleStore::new(store);
        assert!(rules.load().unwrap().is_empty());
    }

    #[test]
    fn test_json_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rules.json");

        let mut rules = CustomRuleStore::new(JsonFileStore::new(&path));
        assert!(rules.load().unwrap().is_empty());

        rules.add("5ec.", "Sec.").unwrap();
        assert!(path.exists());

        // Other keys in the same file survive rule updates.
        let mut store = JsonFileStore::new(&path);
        store.set("OtherKey", "value").unwrap();

        let reopened = CustomRuleStore::new(JsonFileStore::new(&path));
        assert_eq!(reopened.load().unwrap().get("5ec.").map(String::as_str), Some("Sec."));
        assert_eq!(JsonFileStore::new(&path).get("OtherKey").unwrap().as_deref(), Some("value"));

        let mut reopened = reopened;
        reopened.clear().unwrap();
        assert!(reopened.load().unwrap().is_empty());
        assert_eq!(JsonFileStore::new(&path).get("OtherKey").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_non_object_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.get("CustomOCRRules"), Err(StoreError::Layout)));
    }
}
