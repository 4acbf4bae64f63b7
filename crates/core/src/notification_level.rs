//! Specificity tiers for notification preference records.
//!
//! A record is addressed by its level and entity id. The composite
//! `"<level>:<entityId>"` string is the only key a store uses.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// NotificationLevel
// ---------------------------------------------------------------------------

/// The tier at which a preference record is defined.
///
/// Variants are declared from least to most specific, so the derived
/// ordering is `User < Site < Asset < Job`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    User,
    Site,
    Asset,
    Job,
}

/// Every level, least specific first.
pub const ALL_LEVELS: [NotificationLevel; 4] = [
    NotificationLevel::User,
    NotificationLevel::Site,
    NotificationLevel::Asset,
    NotificationLevel::Job,
];

impl NotificationLevel {
    /// Return the wire-format string for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Site => "site",
            Self::Asset => "asset",
            Self::Job => "job",
        }
    }

    /// Parse from a wire-format string.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "user" => Ok(Self::User),
            "site" => Ok(Self::Site),
            "asset" => Ok(Self::Asset),
            "job" => Ok(Self::Job),
            _ => Err(CoreError::Validation(format!(
                "Invalid notification level: '{s}'. Must be one of: user, site, asset, job"
            ))),
        }
    }
}

impl std::fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Storage keys
// ---------------------------------------------------------------------------

/// Build the composite `"<level>:<entityId>"` key for a record.
pub fn storage_key(level: NotificationLevel, entity_id: &str) -> String {
    format!("{}:{entity_id}", level.as_str())
}

/// Split a composite key back into its level and entity id.
///
/// Only the first `:` separates the two parts, so entity ids may
/// themselves contain colons.
pub fn parse_storage_key(key: &str) -> Result<(NotificationLevel, String), CoreError> {
    let (level, entity_id) = key.split_once(':').ok_or_else(|| {
        CoreError::Validation(format!(
            "Invalid storage key '{key}'. Expected '<level>:<entityId>'"
        ))
    })?;
    if entity_id.is_empty() {
        return Err(CoreError::Validation(format!(
            "Invalid storage key '{key}'. Entity id must not be empty"
        )));
    }
    Ok((NotificationLevel::from_str(level)?, entity_id.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
