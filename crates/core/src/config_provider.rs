//! Keyed access to stored preference records.
//!
//! The resolver and inspector read through [`ConfigProvider`], so callers
//! decide where records live: [`InMemoryConfigProvider`] here, or a
//! persistent provider from the store crate.

use std::collections::BTreeMap;
use std::convert::Infallible;

use crate::notification_level::{storage_key, NotificationLevel};
use crate::notification_preferences::NotificationPreferences;

/// A map from `(level, entity_id)` to a preference record.
///
/// At most one record exists per key; `set` replaces silently.
pub trait ConfigProvider {
    /// Error raised by mutations (e.g. a failed write-through).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Look up the record stored for `(level, entity_id)`.
    fn get(&self, level: NotificationLevel, entity_id: &str) -> Option<&NotificationPreferences>;

    /// Insert or replace the record under its own composite key.
    fn set(&mut self, preferences: NotificationPreferences) -> Result<(), Self::Error>;

    /// Remove the record for `(level, entity_id)`, returning whether one existed.
    fn delete(&mut self, level: NotificationLevel, entity_id: &str) -> Result<bool, Self::Error>;

    /// Every stored record, ordered by composite key.
    fn get_all(&self) -> Vec<&NotificationPreferences>;

    fn len(&self) -> usize {
        self.get_all().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// InMemoryConfigProvider
// ---------------------------------------------------------------------------

/// A provider holding records in a map keyed by `"<level>:<entityId>"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryConfigProvider {
    records: BTreeMap<String, NotificationPreferences>,
}

impl InMemoryConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing keyed map (e.g. one decoded from storage).
    pub fn from_map(records: BTreeMap<String, NotificationPreferences>) -> Self {
        Self { records }
    }

    pub fn as_map(&self) -> &BTreeMap<String, NotificationPreferences> {
        &self.records
    }

    pub fn into_map(self) -> BTreeMap<String, NotificationPreferences> {
        self.records
    }
}

impl ConfigProvider for InMemoryConfigProvider {
    type Error = Infallible;

    fn get(&self, level: NotificationLevel, entity_id: &str) -> Option<&NotificationPreferences> {
        self.records.get(&storage_key(level, entity_id))
    }

    fn set(&mut self, preferences: NotificationPreferences) -> Result<(), Self::Error> {
        self.records.insert(preferences.storage_key(), preferences);
        Ok(())
    }

    fn delete(&mut self, level: NotificationLevel, entity_id: &str) -> Result<bool, Self::Error> {
        Ok(self.records.remove(&storage_key(level, entity_id)).is_some())
    }

    fn get_all(&self) -> Vec<&NotificationPreferences> {
        self.records.values().collect()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

impl FromIterator<NotificationPreferences> for InMemoryConfigProvider {
    fn from_iter<I: IntoIterator<Item = NotificationPreferences>>(iter: I) -> Self {
        Self {
            records: iter
                .into_iter()
                .map(|prefs| (prefs.storage_key(), prefs))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
