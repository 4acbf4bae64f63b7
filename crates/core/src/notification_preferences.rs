//! Notification preference records: channels, alert filters, quiet hours,
//! frequency limits, the built-in default baseline, override construction,
//! and validation.
//!
//! Field names serialise in camelCase so that a persisted configuration map
//! keeps the shape consumed by the dashboard.

use chrono::{NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::error::CoreError;
use crate::notification_level::NotificationLevel;
use crate::types::{EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Format of quiet-hour boundaries (`HH:mm`).
pub const QUIET_HOURS_TIME_FORMAT: &str = "%H:%M";

pub const DEFAULT_QUIET_HOURS_START: &str = "22:00";
pub const DEFAULT_QUIET_HOURS_END: &str = "07:00";
pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_MAX_PER_HOUR: u32 = 10;
pub const DEFAULT_MAX_PER_DAY: u32 = 50;

/// Maximum length of an override reason.
pub const MAX_OVERRIDE_REASON_LENGTH: usize = 500;

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailChannel {
    pub enabled: bool,
    #[serde(default)]
    pub addresses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsChannel {
    pub enabled: bool,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushChannel {
    pub enabled: bool,
    #[serde(default)]
    pub device_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookChannel {
    pub enabled: bool,
    #[serde(default)]
    pub endpoints: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

/// Per-channel delivery settings.
///
/// An enabled channel with an empty target list is accepted; nothing
/// requires targets to be present before a channel is switched on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationChannels {
    pub email: EmailChannel,
    pub sms: SmsChannel,
    pub push: PushChannel,
    pub webhook: WebhookChannel,
}

// ---------------------------------------------------------------------------
// Alert filters
// ---------------------------------------------------------------------------

/// Severity of an asset alert, least severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(CoreError::Validation(format!(
                "Invalid severity: '{s}'. Must be one of: low, medium, high, critical"
            ))),
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which alerts are admitted. Empty lists admit everything; `None` scoping
/// lists mean "all sites" / "all assets".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertFilters {
    #[serde(default)]
    pub alert_types: Vec<String>,
    #[serde(default)]
    pub severities: Vec<AlertSeverity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sites: Option<Vec<EntityId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<Vec<EntityId>>,
}

// ---------------------------------------------------------------------------
// Quiet hours and frequency limits
// ---------------------------------------------------------------------------

/// A daily window during which non-critical delivery is held back.
///
/// `start`/`end` are `HH:mm` in `timezone`. A window whose start is after
/// its end spans midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuietHours {
    pub enabled: bool,
    pub start: String,
    pub end: String,
    pub timezone: String,
    pub bypass_for_critical: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<Weekday>>,
}

impl Default for QuietHours {
    fn default() -> Self {
        Self {
            enabled: false,
            start: DEFAULT_QUIET_HOURS_START.to_string(),
            end: DEFAULT_QUIET_HOURS_END.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            bypass_for_critical: true,
            days: None,
        }
    }
}

impl QuietHours {
    /// Parse the window boundaries. `None` if either is not `HH:mm`.
    pub fn window(&self) -> Option<(NaiveTime, NaiveTime)> {
        let start = NaiveTime::parse_from_str(&self.start, QUIET_HOURS_TIME_FORMAT).ok()?;
        let end = NaiveTime::parse_from_str(&self.end, QUIET_HOURS_TIME_FORMAT).ok()?;
        Some((start, end))
    }
}

/// Advisory delivery caps. Nothing in this crate enforces them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_per_hour: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_per_day: Option<u32>,
    #[serde(default)]
    pub digest_mode: bool,
}

// ---------------------------------------------------------------------------
// NotificationPreferences
// ---------------------------------------------------------------------------

/// A complete preference record for one `(level, entity_id)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    pub id: String,
    pub level: NotificationLevel,
    pub entity_id: EntityId,
    pub channels: NotificationChannels,
    #[serde(default)]
    pub alert_filters: AlertFilters,
    #[serde(default)]
    pub quiet_hours: QuietHours,
    #[serde(default)]
    pub frequency_limits: FrequencyLimits,
    #[serde(default)]
    pub is_override: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl NotificationPreferences {
    /// The composite store key of this record.
    pub fn storage_key(&self) -> String {
        crate::notification_level::storage_key(self.level, &self.entity_id)
    }
}

/// The built-in user baseline used when a user has no stored record.
pub fn default_preferences(user_id: &str) -> NotificationPreferences {
    let now = Utc::now();
    NotificationPreferences {
        id: format!("default-{user_id}"),
        level: NotificationLevel::User,
        entity_id: user_id.to_string(),
        channels: NotificationChannels {
            email: EmailChannel {
                enabled: true,
                ..Default::default()
            },
            sms: SmsChannel::default(),
            push: PushChannel {
                enabled: true,
                ..Default::default()
            },
            webhook: WebhookChannel::default(),
        },
        alert_filters: AlertFilters::default(),
        quiet_hours: QuietHours::default(),
        frequency_limits: FrequencyLimits {
            max_per_hour: Some(DEFAULT_MAX_PER_HOUR),
            max_per_day: Some(DEFAULT_MAX_PER_DAY),
            digest_mode: false,
        },
        is_override: false,
        override_reason: None,
        created_at: now,
        updated_at: now,
    }
}

/// Derive an override record from `parent`.
///
/// The copy keeps every behavioural setting of the parent, receives a new
/// id and timestamps, and is flagged as an override. Whether a record
/// already exists under the new key is not checked; saving upserts.
pub fn create_override(
    parent: &NotificationPreferences,
    level: NotificationLevel,
    entity_id: &str,
    reason: Option<String>,
) -> NotificationPreferences {
    let now = Utc::now();
    NotificationPreferences {
        id: uuid::Uuid::now_v7().to_string(),
        level,
        entity_id: entity_id.to_string(),
        is_override: true,
        override_reason: reason,
        created_at: now,
        updated_at: now,
        ..parent.clone()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check a record supplied from outside (e.g. an edited file) before it
/// is persisted. Stores themselves accept any record.
pub fn validate_preferences(prefs: &NotificationPreferences) -> Result<(), CoreError> {
    if prefs.entity_id.trim().is_empty() {
        return Err(CoreError::Validation(
            "entityId must not be empty".to_string(),
        ));
    }
    if prefs.level == NotificationLevel::User && prefs.is_override {
        return Err(CoreError::Validation(
            "A user-level configuration cannot be an override".to_string(),
        ));
    }
    if let Some(reason) = &prefs.override_reason {
        if reason.chars().count() > MAX_OVERRIDE_REASON_LENGTH {
            return Err(CoreError::Validation(format!(
                "overrideReason exceeds maximum length of {MAX_OVERRIDE_REASON_LENGTH} characters"
            )));
        }
    }

    validate_quiet_hours(&prefs.quiet_hours)?;
    validate_frequency_limits(&prefs.frequency_limits)?;

    for address in &prefs.channels.email.addresses {
        if !address.as_str().validate_email() {
            return Err(CoreError::Validation(format!(
                "Invalid email address: '{address}'"
            )));
        }
    }
    for endpoint in &prefs.channels.webhook.endpoints {
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(CoreError::Validation(format!(
                "Invalid webhook endpoint: '{endpoint}'. Must be an http(s) URL"
            )));
        }
    }
    Ok(())
}

/// Quiet-hour boundaries must be `HH:mm`; an enabled window needs a timezone.
pub fn validate_quiet_hours(quiet_hours: &QuietHours) -> Result<(), CoreError> {
    for (field, value) in [("start", &quiet_hours.start), ("end", &quiet_hours.end)] {
        if NaiveTime::parse_from_str(value, QUIET_HOURS_TIME_FORMAT).is_err() {
            return Err(CoreError::Validation(format!(
                "quietHours.{field} must be HH:mm, got '{value}'"
            )));
        }
    }
    if quiet_hours.enabled && quiet_hours.timezone.trim().is_empty() {
        return Err(CoreError::Validation(
            "quietHours.timezone must not be empty when quiet hours are enabled".to_string(),
        ));
    }
    Ok(())
}

/// An hourly cap may not exceed the daily cap.
pub fn validate_frequency_limits(limits: &FrequencyLimits) -> Result<(), CoreError> {
    if let (Some(per_hour), Some(per_day)) = (limits.max_per_hour, limits.max_per_day) {
        if per_hour > 0 && per_day > 0 && per_hour > per_day {
            return Err(CoreError::Validation(format!(
                "maxPerHour ({per_hour}) must not exceed maxPerDay ({per_day})"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn user_prefs(user_id: &str) -> NotificationPreferences {
        let mut prefs = default_preferences(user_id);
        prefs.id = format!("pref-{user_id}");
        prefs.channels.email.addresses = vec![format!("{user_id}@example.com")];
        prefs
    }

    // -- default_preferences ------------------------------------------------

    #[test]
    fn default_is_user_level_baseline() {
        let prefs = default_preferences("alice");
        assert_eq!(prefs.level, NotificationLevel::User);
        assert_eq!(prefs.entity_id, "alice");
        assert_eq!(prefs.id, "default-alice");
        assert!(!prefs.is_override);
        assert!(prefs.channels.email.enabled);
        assert!(prefs.channels.push.enabled);
        assert!(!prefs.channels.sms.enabled);
        assert!(!prefs.channels.webhook.enabled);
        assert!(!prefs.quiet_hours.enabled);
        assert!(prefs.quiet_hours.bypass_for_critical);
        assert_eq!(prefs.frequency_limits.max_per_hour, Some(DEFAULT_MAX_PER_HOUR));
        assert_eq!(prefs.frequency_limits.max_per_day, Some(DEFAULT_MAX_PER_DAY));
    }

    #[test]
    fn default_passes_validation() {
        assert!(validate_preferences(&default_preferences("alice")).is_ok());
    }

    // -- create_override ----------------------------------------------------

    #[test]
    fn override_copies_settings_and_flags() {
        let parent = user_prefs("alice");
        let child = create_override(
            &parent,
            NotificationLevel::Site,
            "SITE-1",
            Some("night shift".into()),
        );

        assert_ne!(child.id, parent.id);
        assert_eq!(child.level, NotificationLevel::Site);
        assert_eq!(child.entity_id, "SITE-1");
        assert!(child.is_override);
        assert_eq!(child.override_reason.as_deref(), Some("night shift"));
        assert_eq!(child.channels, parent.channels);
        assert_eq!(child.alert_filters, parent.alert_filters);
        assert_eq!(child.quiet_hours, parent.quiet_hours);
        assert_eq!(child.frequency_limits, parent.frequency_limits);
        assert!(child.created_at >= parent.created_at);
    }

    #[test]
    fn overrides_get_distinct_ids() {
        let parent = user_prefs("alice");
        let a = create_override(&parent, NotificationLevel::Asset, "A-1", None);
        let b = create_override(&parent, NotificationLevel::Asset, "A-1", None);
        assert_ne!(a.id, b.id);
    }

    // -- serde --------------------------------------------------------------

    #[test]
    fn serialises_camel_case_fields() {
        let prefs = user_prefs("alice");
        let json = serde_json::to_value(&prefs).unwrap();
        assert_eq!(json["entityId"], "alice");
        assert_eq!(json["level"], "user");
        assert_eq!(json["isOverride"], false);
        assert_eq!(json["channels"]["email"]["enabled"], true);
        assert!(json["channels"]["sms"]["phoneNumbers"].is_array());
        assert_eq!(json["quietHours"]["bypassForCritical"], true);
        assert!(json.get("overrideReason").is_none());
    }

    #[test]
    fn deserialises_minimal_record() {
        let json = serde_json::json!({
            "id": "p1",
            "level": "site",
            "entityId": "SITE-1",
            "channels": {
                "email": { "enabled": false },
                "sms": { "enabled": false },
                "push": { "enabled": true },
                "webhook": { "enabled": false }
            },
            "isOverride": true,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });
        let prefs: NotificationPreferences = serde_json::from_value(json).unwrap();
        assert_eq!(prefs.level, NotificationLevel::Site);
        assert!(prefs.is_override);
        assert!(prefs.alert_filters.alert_types.is_empty());
        assert_eq!(prefs.quiet_hours, QuietHours::default());
    }

    #[test]
    fn quiet_hours_days_use_weekday_names() {
        let quiet = QuietHours {
            days: Some(vec![Weekday::Sat, Weekday::Sun]),
            ..Default::default()
        };
        let json = serde_json::to_value(&quiet).unwrap();
        assert_eq!(json["days"], serde_json::json!(["Sat", "Sun"]));
    }

    // -- validation ---------------------------------------------------------

    #[test]
    fn user_level_override_rejects() {
        let mut prefs = user_prefs("alice");
        prefs.is_override = true;
        assert_matches!(validate_preferences(&prefs), Err(CoreError::Validation(_)));
    }

    #[test]
    fn empty_entity_id_rejects() {
        let mut prefs = user_prefs("alice");
        prefs.entity_id = "  ".into();
        assert!(validate_preferences(&prefs).is_err());
    }

    #[test]
    fn bad_quiet_hours_time_rejects() {
        let mut prefs = user_prefs("alice");
        prefs.quiet_hours.start = "25:00".into();
        let err = validate_preferences(&prefs).unwrap_err();
        assert!(err.to_string().contains("quietHours.start"));
    }

    #[test]
    fn enabled_quiet_hours_need_timezone() {
        let mut prefs = user_prefs("alice");
        prefs.quiet_hours.enabled = true;
        prefs.quiet_hours.timezone = String::new();
        assert!(validate_preferences(&prefs).is_err());
    }

    #[test]
    fn hourly_cap_above_daily_cap_rejects() {
        let mut prefs = user_prefs("alice");
        prefs.frequency_limits.max_per_hour = Some(100);
        prefs.frequency_limits.max_per_day = Some(20);
        assert!(validate_preferences(&prefs).is_err());
    }

    #[test]
    fn invalid_email_rejects() {
        let mut prefs = user_prefs("alice");
        prefs.channels.email.addresses.push("not-an-address".into());
        let err = validate_preferences(&prefs).unwrap_err();
        assert!(err.to_string().contains("not-an-address"));
    }

    #[test]
    fn non_http_webhook_rejects() {
        let mut prefs = user_prefs("alice");
        prefs.channels.webhook.endpoints = vec!["ftp://hooks.example.com".into()];
        assert!(validate_preferences(&prefs).is_err());
    }

    #[test]
    fn enabled_channel_without_targets_is_accepted() {
        let mut prefs = user_prefs("alice");
        prefs.channels.sms.enabled = true;
        prefs.channels.sms.phone_numbers.clear();
        assert!(validate_preferences(&prefs).is_ok());
    }

    #[test]
    fn overlong_reason_rejects() {
        let parent = user_prefs("alice");
        let child = create_override(
            &parent,
            NotificationLevel::Site,
            "SITE-1",
            Some("x".repeat(MAX_OVERRIDE_REASON_LENGTH + 1)),
        );
        assert!(validate_preferences(&child).is_err());
    }
}
