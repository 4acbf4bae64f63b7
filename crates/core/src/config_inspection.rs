//! Read-only report of which levels hold a stored configuration for a
//! context, alongside the resolved result.

use serde::Serialize;

use crate::config_provider::ConfigProvider;
use crate::config_resolution::{
    resolve_notification_config, EffectiveNotificationConfig, ResolutionContext,
};
use crate::notification_level::NotificationLevel;
use crate::notification_preferences::NotificationPreferences;
use crate::types::EntityId;

/// What is stored for one level of the context.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelInspection {
    pub level: NotificationLevel,
    pub entity_id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    pub exists: bool,
    pub is_override: bool,
    pub config: Option<NotificationPreferences>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationInspection {
    pub effective: EffectiveNotificationConfig,
    pub levels: Vec<LevelInspection>,
}

/// Resolve `ctx` and list, for the user and every scoped level present in
/// the context, whether a record is stored.
pub fn inspect_configuration<P>(provider: &P, ctx: &ResolutionContext) -> ConfigurationInspection
where
    P: ConfigProvider + ?Sized,
{
    let effective = resolve_notification_config(provider, ctx);

    let mut levels = Vec::with_capacity(4);
    levels.push(inspect_level(provider, NotificationLevel::User, &ctx.user_id, None));
    for (level, entity_id, entity_name) in ctx.scoped_levels() {
        levels.push(inspect_level(provider, level, entity_id, Some(entity_name)));
    }

    ConfigurationInspection { effective, levels }
}

fn inspect_level<P>(
    provider: &P,
    level: NotificationLevel,
    entity_id: &str,
    entity_name: Option<&str>,
) -> LevelInspection
where
    P: ConfigProvider + ?Sized,
{
    let config = provider.get(level, entity_id).cloned();
    LevelInspection {
        level,
        entity_id: entity_id.to_string(),
        entity_name: entity_name.map(str::to_string),
        exists: config.is_some(),
        is_override: config.as_ref().is_some_and(|c| c.is_override),
        config,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_provider::InMemoryConfigProvider;
    use crate::notification_preferences::{create_override, default_preferences};

    #[test]
    fn user_only_context_lists_one_level() {
        let provider: InMemoryConfigProvider = [default_preferences("alice")].into_iter().collect();
        let report = inspect_configuration(&provider, &ResolutionContext::for_user("alice"));

        assert_eq!(report.levels.len(), 1);
        assert_eq!(report.levels[0].level, NotificationLevel::User);
        assert!(report.levels[0].exists);
        assert!(!report.effective.source.is_default);
    }

    #[test]
    fn reports_missing_levels_without_failing() {
        let user = default_preferences("alice");
        let asset = create_override(&user, NotificationLevel::Asset, "A-7", None);
        let provider: InMemoryConfigProvider = [user, asset].into_iter().collect();
        let ctx = ResolutionContext::for_user("alice")
            .with_site("SITE-1", "Depot")
            .with_asset("A-7", "Forklift 7");

        let report = inspect_configuration(&provider, &ctx);

        let summary: Vec<(NotificationLevel, bool, bool)> = report
            .levels
            .iter()
            .map(|l| (l.level, l.exists, l.is_override))
            .collect();
        assert_eq!(
            summary,
            vec![
                (NotificationLevel::User, true, false),
                (NotificationLevel::Site, false, false),
                (NotificationLevel::Asset, true, true),
            ]
        );
        assert!(report.levels[1].config.is_none());
        assert_eq!(report.levels[2].entity_name.as_deref(), Some("Forklift 7"));
        assert_eq!(report.effective.source.level, NotificationLevel::Asset);
    }

    #[test]
    fn inspection_does_not_mutate_provider() {
        let provider = InMemoryConfigProvider::new();
        let before = provider.clone();
        let report = inspect_configuration(&provider, &ResolutionContext::for_user("nobody"));
        assert!(!report.levels[0].exists);
        assert!(report.effective.source.is_default);
        assert_eq!(provider, before);
    }
}
