//! Field-level diff between two preference records.
//!
//! Used by the resolver to report which settings an override changes
//! relative to the user baseline.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::notification_preferences::NotificationPreferences;

/// Top-level record sections that carry behaviour. Identity and audit
/// fields (`id`, `level`, `entityId`, `isOverride`, timestamps) never
/// appear in a diff.
pub const DIFFED_SECTIONS: &[&str] = &["channels", "alertFilters", "quietHours", "frequencyLimits"];

/// A single leaf that differs between a baseline and a candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDiff {
    /// Dotted path to the field, e.g. `channels.email.enabled`.
    pub path: String,
    pub baseline: Value,
    pub candidate: Value,
}

/// Recursively compare two JSON values.
///
/// Objects are walked key by key; arrays and scalars are compared as
/// leaves. A key present on only one side is reported with `null` on the
/// other. Output is sorted by path.
pub fn diff_values(baseline: &Value, candidate: &Value) -> Vec<FieldDiff> {
    let mut diffs = Vec::new();
    walk("", baseline, candidate, &mut diffs);
    diffs.sort_by(|a, b| a.path.cmp(&b.path));
    diffs
}

fn walk(path: &str, baseline: &Value, candidate: &Value, out: &mut Vec<FieldDiff>) {
    match (baseline, candidate) {
        (Value::Object(base), Value::Object(cand)) => {
            let keys: BTreeSet<&String> = base.keys().chain(cand.keys()).collect();
            for key in keys {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                walk(
                    &child,
                    base.get(key).unwrap_or(&Value::Null),
                    cand.get(key).unwrap_or(&Value::Null),
                    out,
                );
            }
        }
        _ if baseline != candidate => out.push(FieldDiff {
            path: path.to_string(),
            baseline: baseline.clone(),
            candidate: candidate.clone(),
        }),
        _ => {}
    }
}

/// Diff the behavioural sections of two preference records.
pub fn diff_preferences(
    baseline: &NotificationPreferences,
    candidate: &NotificationPreferences,
) -> Vec<FieldDiff> {
    diff_values(&behaviour_view(baseline), &behaviour_view(candidate))
}

/// Project a record onto [`DIFFED_SECTIONS`].
fn behaviour_view(prefs: &NotificationPreferences) -> Value {
    let mut sections = serde_json::Map::new();
    if let Ok(Value::Object(full)) = serde_json::to_value(prefs) {
        for section in DIFFED_SECTIONS {
            if let Some(value) = full.get(*section) {
                sections.insert((*section).to_string(), value.clone());
            }
        }
    }
    Value::Object(sections)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
