//! JSON-document persistence for the configuration map.
//!
//! The whole map is stored as a single JSON object keyed by
//! `"<level>:<entityId>"`. Every mutation rewrites the document through a
//! temporary file and a rename so readers never observe a partial write.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use assetwatch_core::config_provider::ConfigProvider;
use assetwatch_core::notification_level::{storage_key, NotificationLevel};
use assetwatch_core::notification_preferences::NotificationPreferences;

use crate::error::{StoreError, StoreResult};

/// File name used when no store path is configured.
pub const DEFAULT_STORE_FILE: &str = "notification-configs.json";

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Serialise the configuration map to its persisted JSON form.
pub fn encode_config_map(map: &BTreeMap<String, NotificationPreferences>) -> StoreResult<String> {
    Ok(serde_json::to_string_pretty(map)?)
}

/// Parse a persisted configuration map.
///
/// Entries stored under a key that does not match their own level and
/// entity id are moved to the matching key. An entry already stored under
/// its own key always wins over a re-keyed one; among re-keyed entries
/// competing for the same key the first in key order is kept.
pub fn decode_config_map(json: &str) -> StoreResult<BTreeMap<String, NotificationPreferences>> {
    let raw: BTreeMap<String, NotificationPreferences> = serde_json::from_str(json)?;
    let (keyed, misplaced): (Vec<_>, Vec<_>) = raw
        .into_iter()
        .partition(|(key, prefs)| *key == prefs.storage_key());

    let mut map: BTreeMap<String, NotificationPreferences> = keyed.into_iter().collect();
    for (key, prefs) in misplaced {
        let expected = prefs.storage_key();
        if map.contains_key(&expected) {
            tracing::warn!(
                stored_key = %key,
                expected_key = %expected,
                "Dropping notification configuration that collides with an existing key"
            );
            continue;
        }
        tracing::warn!(
            stored_key = %key,
            expected_key = %expected,
            "Re-keying notification configuration"
        );
        map.insert(expected, prefs);
    }
    Ok(map)
}

// ---------------------------------------------------------------------------
// JsonFileConfigProvider
// ---------------------------------------------------------------------------

/// A [`ConfigProvider`] backed by a JSON file.
///
/// Records are held in memory; `set` and `delete` persist the full map
/// before returning.
#[derive(Debug)]
pub struct JsonFileConfigProvider {
    path: PathBuf,
    records: BTreeMap<String, NotificationPreferences>,
}

impl JsonFileConfigProvider {
    /// Load the map stored at `path`. A missing file yields an empty store;
    /// the file is created on the first mutation.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let records = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => decode_config_map(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No configuration file yet, starting empty");
                BTreeMap::new()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        tracing::debug!(path = %path.display(), count = records.len(), "Loaded notification configurations");
        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-memory copy of the persisted map.
    pub fn as_map(&self) -> &BTreeMap<String, NotificationPreferences> {
        &self.records
    }

    fn persist(&self) -> StoreResult<()> {
        let json = encode_config_map(&self.records)?;
        let tmp = tmp_path(&self.path);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let written = std::fs::write(&tmp, json)
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })
            .and_then(|()| {
                std::fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            });
        if let Err(e) = written {
            if let Err(cleanup) = std::fs::remove_file(&tmp) {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %tmp.display(), error = %cleanup, "Failed to remove temporary store file");
                }
            }
            return Err(e);
        }

        tracing::debug!(
            path = %self.path.display(),
            count = self.records.len(),
            "Persisted notification configurations"
        );
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

impl ConfigProvider for JsonFileConfigProvider {
    type Error = StoreError;

    fn get(&self, level: NotificationLevel, entity_id: &str) -> Option<&NotificationPreferences> {
        self.records.get(&storage_key(level, entity_id))
    }

    /// On a failed write the in-memory map is restored, so it never holds a
    /// record the file does not.
    fn set(&mut self, preferences: NotificationPreferences) -> Result<(), Self::Error> {
        let key = preferences.storage_key();
        let previous = self.records.insert(key.clone(), preferences);
        if let Err(e) = self.persist() {
            match previous {
                Some(prev) => self.records.insert(key, prev),
                None => self.records.remove(&key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn delete(&mut self, level: NotificationLevel, entity_id: &str) -> Result<bool, Self::Error> {
        let key = storage_key(level, entity_id);
        let Some(removed) = self.records.remove(&key) else {
            return Ok(false);
        };
        if let Err(e) = self.persist() {
            self.records.insert(key, removed);
            return Err(e);
        }
        Ok(true)
    }

    fn get_all(&self) -> Vec<&NotificationPreferences> {
        self.records.values().collect()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
