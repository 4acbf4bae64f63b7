//! Delivery decisions for asset alerts under an effective preference set.
//!
//! Given the preferences that apply to an alert's context, decides whether
//! the alert is delivered, on which channels, and whether it goes to the
//! digest instead of immediate delivery.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::channels::Channel;
use crate::notification_preferences::{AlertSeverity, NotificationPreferences, QuietHours};
use crate::types::EntityId;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An alert raised for an asset or site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEvent {
    /// Free-form alert type, e.g. `geofence_exit` or `low_battery`.
    pub alert_type: String,
    pub severity: AlertSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<EntityId>,
}

/// Why an alert was not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressionReason {
    AlertTypeFiltered,
    SeverityFiltered,
    SiteOutOfScope,
    AssetOutOfScope,
    QuietHours,
    NoChannelsEnabled,
}

impl SuppressionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlertTypeFiltered => "alert_type_filtered",
            Self::SeverityFiltered => "severity_filtered",
            Self::SiteOutOfScope => "site_out_of_scope",
            Self::AssetOutOfScope => "asset_out_of_scope",
            Self::QuietHours => "quiet_hours",
            Self::NoChannelsEnabled => "no_channels_enabled",
        }
    }
}

impl std::fmt::Display for SuppressionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDecision {
    pub deliver: bool,
    pub channels: Vec<Channel>,
    /// Queue for the periodic digest instead of sending immediately.
    pub digest: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppressed_by: Option<SuppressionReason>,
}

impl DeliveryDecision {
    fn suppressed(reason: SuppressionReason) -> Self {
        Self {
            deliver: false,
            channels: Vec::new(),
            digest: false,
            suppressed_by: Some(reason),
        }
    }
}

// ---------------------------------------------------------------------------
// Quiet hours
// ---------------------------------------------------------------------------

/// Whether `local` (already in the quiet-hours timezone) falls inside the
/// window for an alert of `severity`.
///
/// A window whose start is after its end spans midnight; its early-morning
/// part belongs to the previous day for the `days` restriction. Equal or
/// unparsable boundaries mean no window.
pub fn is_within_quiet_hours(
    quiet_hours: &QuietHours,
    local: NaiveDateTime,
    severity: AlertSeverity,
) -> bool {
    if !quiet_hours.enabled {
        return false;
    }
    if severity == AlertSeverity::Critical && quiet_hours.bypass_for_critical {
        return false;
    }
    let Some((start, end)) = quiet_hours.window() else {
        return false;
    };

    let time = local.time();
    let opened_on = if start < end {
        if time >= start && time < end {
            local.weekday()
        } else {
            return false;
        }
    } else if start > end {
        if time >= start {
            local.weekday()
        } else if time < end {
            local.weekday().pred()
        } else {
            return false;
        }
    } else {
        return false;
    };

    match &quiet_hours.days {
        Some(days) if !days.is_empty() => days.contains(&opened_on),
        _ => true,
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// The channels switched on in `prefs`, in a fixed order.
pub fn enabled_channels(prefs: &NotificationPreferences) -> Vec<Channel> {
    let c = &prefs.channels;
    [
        (Channel::Email, c.email.enabled),
        (Channel::Sms, c.sms.enabled),
        (Channel::Push, c.push.enabled),
        (Channel::Webhook, c.webhook.enabled),
    ]
    .into_iter()
    .filter_map(|(channel, on)| on.then_some(channel))
    .collect()
}

/// Decide delivery of `alert` under `prefs` at local time `local`.
///
/// Checks run in order: alert type, severity, site scope, asset scope,
/// quiet hours, enabled channels. The first failing check suppresses the
/// alert. Scope lists only reject alerts that name a site/asset outside
/// the list.
pub fn evaluate_alert(
    prefs: &NotificationPreferences,
    alert: &AlertEvent,
    local: NaiveDateTime,
) -> DeliveryDecision {
    let filters = &prefs.alert_filters;

    if !filters.alert_types.is_empty() && !filters.alert_types.contains(&alert.alert_type) {
        return DeliveryDecision::suppressed(SuppressionReason::AlertTypeFiltered);
    }
    if !filters.severities.is_empty() && !filters.severities.contains(&alert.severity) {
        return DeliveryDecision::suppressed(SuppressionReason::SeverityFiltered);
    }
    if let (Some(sites), Some(site_id)) = (&filters.sites, &alert.site_id) {
        if !sites.is_empty() && !sites.contains(site_id) {
            return DeliveryDecision::suppressed(SuppressionReason::SiteOutOfScope);
        }
    }
    if let (Some(assets), Some(asset_id)) = (&filters.assets, &alert.asset_id) {
        if !assets.is_empty() && !assets.contains(asset_id) {
            return DeliveryDecision::suppressed(SuppressionReason::AssetOutOfScope);
        }
    }
    if is_within_quiet_hours(&prefs.quiet_hours, local, alert.severity) {
        return DeliveryDecision::suppressed(SuppressionReason::QuietHours);
    }

    let channels = enabled_channels(prefs);
    if channels.is_empty() {
        return DeliveryDecision::suppressed(SuppressionReason::NoChannelsEnabled);
    }

    DeliveryDecision {
        deliver: true,
        channels,
        digest: prefs.frequency_limits.digest_mode && alert.severity != AlertSeverity::Critical,
        suppressed_by: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
