// SPDX-License-Identifier: MIT
// Copyright 2026 Fabula Authors

//! Durable key-value persistence backed by a single JSON document.
//!
//! The store file is created lazily on first write with `0o600`
//! permissions. An unreadable or unparsable file is treated as empty; the
//! substrate never propagates parse failures upward.

use crate::error::{CoreError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Store file name under the data directory.
const STORE_FILE_NAME: &str = "fabula-store.json";

/// Durable local key-value store.
///
/// An interior mutex serializes read-modify-write cycles so that
/// multi-key operations ([`LocalStore::set_many`],
/// [`LocalStore::remove_many`]) are atomic with respect to other calls.
pub struct LocalStore {
    path: PathBuf,
    state: Mutex<Map<String, Value>>,
}

impl LocalStore {
    /// Open the store under the given data directory.
    ///
    /// A missing file yields an empty store; a corrupt file is logged and
    /// also yields an empty store.
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(STORE_FILE_NAME);
        let state = match std::fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str::<Map<String, Value>>(&data) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "Corrupt store file, starting empty");
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "Failed to read store file, starting empty");
                Map::new()
            }
        };

        Self {
            path,
            state: Mutex::new(state),
        }
    }

    /// Read a typed value.
    ///
    /// Returns `Ok(None)` when the key is absent and an error when a value
    /// is present but cannot be deserialized; the caller decides whether
    /// to recover or propagate.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let map = self.lock();
        match map.get(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| CoreError::Storage(format!("corrupt value for key {key}: {e}"))),
        }
    }

    /// Write a single key.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| CoreError::Storage(format!("serialize {key}: {e}")))?;
        let mut map = self.lock();
        map.insert(key.to_string(), value);
        self.persist(&map)
    }

    /// Write several keys in one persisted update.
    pub fn set_many(&self, entries: &[(&str, Value)]) -> Result<()> {
        let mut map = self.lock();
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        self.persist(&map)
    }

    /// Remove several keys in one persisted update. Missing keys are
    /// ignored; removing from an empty store is a no-op.
    pub fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut map = self.lock();
        let mut changed = false;
        for key in keys {
            changed |= map.remove(*key).is_some();
        }
        if !changed {
            return Ok(());
        }
        self.persist(&map)
    }

    /// Whether a key currently holds a value.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Map<String, Value>> {
        self.state.lock().expect("store mutex poisoned")
    }

    fn persist(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::Storage(format!("create {}: {e}", parent.display())))?;
        }

        let json = serde_json::to_string_pretty(map)
            .map_err(|e| CoreError::Storage(format!("serialize store: {e}")))?;
        std::fs::write(&self.path, &json)
            .map_err(|e| CoreError::Storage(format!("write {}: {e}", self.path.display())))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&self.path, perms);
        }

        Ok(())
    }
}
