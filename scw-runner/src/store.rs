//! Persistent preference store
//!
//! A small get/set/remove interface over a durable key/value substrate.
//! Every operation is infallible from the caller's point of view: when the
//! substrate is missing or broken the store behaves as empty and writes are
//! dropped with a warning.

use anyhow::{Context, Result};
use scw_core::Endpoint;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Slot holding the last known endpoint
pub const API_URL_KEY: &str = "apiUrl";

/// Durable key/value substrate
pub trait PreferenceStore: Send + Sync {
    /// Reads a value; absent when unset or when the substrate is unavailable
    fn get(&self, key: &str) -> Option<String>;

    /// Writes a value; writing the value already stored is a no-op
    fn set(&self, key: &str, value: &str);

    /// Removes a value if present
    fn remove(&self, key: &str);
}

/// In-process store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(key);
    }
}

/// Store used when no substrate is available
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

impl PreferenceStore for NullStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, key: &str, _value: &str) {
        debug!("No preference store available, dropping write to '{}'", key);
    }

    fn remove(&self, _key: &str) {}
}

/// JSON file store
///
/// The file holds a flat object of string slots. It is re-read on every
/// access so edits made by another process are picked up.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> BTreeMap<String, String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!(
                    "Preference file {} unreadable, treating as empty: {}",
                    self.path.display(),
                    e
                );
                return BTreeMap::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(
                "Preference file {} is not valid JSON, treating as empty: {}",
                self.path.display(),
                e
            );
            BTreeMap::new()
        })
    }

    fn save(&self, slots: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(slots).context("Failed to encode preferences")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load().remove(key)
    }

    fn set(&self, key: &str, value: &str) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut slots = self.load();
        if slots.get(key).map(String::as_str) == Some(value) {
            return;
        }
        slots.insert(key.to_string(), value.to_string());
        if let Err(e) = self.save(&slots) {
            warn!("Dropping preference write to '{}': {:#}", key, e);
        }
    }

    fn remove(&self, key: &str) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut slots = self.load();
        if slots.remove(key).is_none() {
            return;
        }
        if let Err(e) = self.save(&slots) {
            warn!("Dropping preference removal of '{}': {:#}", key, e);
        }
    }
}

/// The "last known endpoint" slot
///
/// Values are normalized on the way in and on the way out; a blank stored
/// value reads back as absent.
#[derive(Clone)]
pub struct EndpointPreference {
    store: Arc<dyn PreferenceStore>,
}

impl EndpointPreference {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    pub fn get(&self) -> Option<Endpoint> {
        self.store.get(API_URL_KEY).and_then(Endpoint::parse)
    }

    /// Persists the endpoint; the empty endpoint clears the slot
    pub fn set(&self, endpoint: &Endpoint) {
        if endpoint.is_empty() {
            self.clear();
        } else {
            self.store.set(API_URL_KEY, endpoint.as_str());
        }
    }

    pub fn clear(&self) {
        self.store.remove(API_URL_KEY);
    }
}
