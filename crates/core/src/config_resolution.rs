//! Effective notification configuration resolution.
//!
//! Walks the override chain from the user baseline to the most specific
//! level present in the context. A site, asset or job record only takes
//! effect when it is flagged as an override; otherwise it is recorded in
//! the inheritance chain as inactive.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config_provider::ConfigProvider;
use crate::notification_level::NotificationLevel;
use crate::notification_preferences::{default_preferences, NotificationPreferences};
use crate::override_diff::diff_preferences;
use crate::types::EntityId;

// ---------------------------------------------------------------------------
// Context descriptors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRef {
    pub id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRef {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRef {
    pub id: EntityId,
    pub name: String,
}

/// The entities a notification concerns. Each descriptor carries its own
/// id, so a level is considered exactly when its descriptor is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionContext {
    pub user_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<SiteRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<AssetRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<JobRef>,
}

impl ResolutionContext {
    pub fn for_user(user_id: impl Into<EntityId>) -> Self {
        Self {
            user_id: user_id.into(),
            site: None,
            asset: None,
            job: None,
        }
    }

    pub fn with_site(mut self, id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        self.site = Some(SiteRef {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    pub fn with_asset(mut self, id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        self.asset = Some(AssetRef {
            id: id.into(),
            name: name.into(),
            site_id: self.site.as_ref().map(|s| s.id.clone()),
        });
        self
    }

    pub fn with_job(mut self, id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        self.job = Some(JobRef {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    /// The scoped levels present in this context, least specific first:
    /// `(level, entity_id, entity_name)`.
    pub fn scoped_levels(&self) -> Vec<(NotificationLevel, &str, &str)> {
        let mut levels = Vec::with_capacity(3);
        if let Some(site) = &self.site {
            levels.push((NotificationLevel::Site, site.id.as_str(), site.name.as_str()));
        }
        if let Some(asset) = &self.asset {
            levels.push((NotificationLevel::Asset, asset.id.as_str(), asset.name.as_str()));
        }
        if let Some(job) = &self.job {
            levels.push((NotificationLevel::Job, job.id.as_str(), job.name.as_str()));
        }
        levels
    }
}

// ---------------------------------------------------------------------------
// Resolution output
// ---------------------------------------------------------------------------

/// Which record won resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSource {
    pub level: NotificationLevel,
    pub entity_id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    /// True when no user record was stored and the built-in baseline applied.
    pub is_default: bool,
}

/// One level considered during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InheritanceEntry {
    pub level: NotificationLevel,
    pub entity_id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    pub is_override: bool,
    pub is_active: bool,
}

/// A setting the winning record changes relative to the user baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideEntry {
    /// Dotted field path, e.g. `channels.email.enabled`.
    pub field: String,
    pub value: Value,
    pub baseline_value: Value,
    pub source: NotificationLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveNotificationConfig {
    pub preferences: NotificationPreferences,
    pub source: ConfigSource,
    pub inheritance_chain: Vec<InheritanceEntry>,
    pub overrides: Vec<OverrideEntry>,
}

impl EffectiveNotificationConfig {
    /// The chain entry that supplied the effective preferences.
    pub fn active_entry(&self) -> Option<&InheritanceEntry> {
        self.inheritance_chain.iter().find(|e| e.is_active)
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve the preferences that apply to `ctx`.
///
/// Resolution rules:
/// 1. The stored user record, if any, seeds the chain as the active entry.
/// 2. For site, asset and job (in that order, each only if present in the
///    context), a stored record flagged `is_override` becomes effective
///    and deactivates every earlier entry. A stored record without the
///    flag is appended inactive.
/// 3. If nothing became effective, the built-in default baseline for the
///    user applies and is recorded at the head of the chain.
/// 4. `overrides` lists every behavioural field where the winner differs
///    from the stored user record.
pub fn resolve_notification_config<P>(provider: &P, ctx: &ResolutionContext) -> EffectiveNotificationConfig
where
    P: ConfigProvider + ?Sized,
{
    let mut chain: Vec<InheritanceEntry> = Vec::new();
    let mut effective: Option<(&NotificationPreferences, ConfigSource)> = None;

    let user_record = provider.get(NotificationLevel::User, &ctx.user_id);
    if let Some(user) = user_record {
        chain.push(InheritanceEntry {
            level: NotificationLevel::User,
            entity_id: ctx.user_id.clone(),
            entity_name: None,
            is_override: user.is_override,
            is_active: true,
        });
        effective = Some((
            user,
            ConfigSource {
                level: NotificationLevel::User,
                entity_id: ctx.user_id.clone(),
                entity_name: None,
                is_default: false,
            },
        ));
    }

    for (level, entity_id, entity_name) in ctx.scoped_levels() {
        let Some(record) = provider.get(level, entity_id) else {
            continue;
        };
        if record.is_override {
            for entry in chain.iter_mut() {
                entry.is_active = false;
            }
            effective = Some((
                record,
                ConfigSource {
                    level,
                    entity_id: entity_id.to_string(),
                    entity_name: Some(entity_name.to_string()),
                    is_default: false,
                },
            ));
        }
        chain.push(InheritanceEntry {
            level,
            entity_id: entity_id.to_string(),
            entity_name: Some(entity_name.to_string()),
            is_override: record.is_override,
            is_active: record.is_override,
        });
    }

    let (preferences, source) = match effective {
        Some((record, source)) => (record.clone(), source),
        None => {
            chain.insert(
                0,
                InheritanceEntry {
                    level: NotificationLevel::User,
                    entity_id: ctx.user_id.clone(),
                    entity_name: None,
                    is_override: false,
                    is_active: true,
                },
            );
            (
                default_preferences(&ctx.user_id),
                ConfigSource {
                    level: NotificationLevel::User,
                    entity_id: ctx.user_id.clone(),
                    entity_name: None,
                    is_default: true,
                },
            )
        }
    };

    let overrides = match user_record {
        Some(baseline) if source.level != NotificationLevel::User => {
            diff_preferences(baseline, &preferences)
                .into_iter()
                .map(|diff| OverrideEntry {
                    field: diff.path,
                    value: diff.candidate,
                    baseline_value: diff.baseline,
                    source: source.level,
                })
                .collect()
        }
        _ => Vec::new(),
    };

    EffectiveNotificationConfig {
        preferences,
        source,
        inheritance_chain: chain,
        overrides,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
