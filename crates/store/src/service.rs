//! Notification configuration service.
//!
//! The operations the dashboard performs on preference records, over an
//! injected [`ConfigProvider`]. The user-level baseline is permanent: it can
//! be replaced but never deleted.

use chrono::Utc;

use assetwatch_core::config_inspection::{inspect_configuration, ConfigurationInspection};
use assetwatch_core::config_provider::ConfigProvider;
use assetwatch_core::config_resolution::{
    resolve_notification_config, EffectiveNotificationConfig, ResolutionContext,
};
use assetwatch_core::error::CoreError;
use assetwatch_core::notification_level::{storage_key, NotificationLevel};
use assetwatch_core::notification_preferences::{create_override, NotificationPreferences};

use crate::error::{StoreError, StoreResult};

/// Message returned when a caller tries to delete a user baseline.
pub const USER_LEVEL_DELETE_ERROR: &str = "Cannot delete user-level configuration";

pub struct NotificationConfigService<P> {
    provider: P,
}

impl<P> NotificationConfigService<P>
where
    P: ConfigProvider,
    StoreError: From<P::Error>,
{
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn into_provider(self) -> P {
        self.provider
    }

    /// Fetch the record stored for `(level, entity_id)`.
    pub fn get_notification_preferences(
        &self,
        level: NotificationLevel,
        entity_id: &str,
    ) -> Option<&NotificationPreferences> {
        self.provider.get(level, entity_id)
    }

    /// Every stored record, ordered by composite key.
    pub fn list(&self) -> Vec<&NotificationPreferences> {
        self.provider.get_all()
    }

    /// Insert or replace a record.
    ///
    /// When a record already exists under the same key its `created_at` is
    /// kept. `updated_at` is always stamped with the current time.
    pub fn save_notification_preferences(
        &mut self,
        mut preferences: NotificationPreferences,
    ) -> StoreResult<NotificationPreferences> {
        if let Some(existing) = self.provider.get(preferences.level, &preferences.entity_id) {
            preferences.created_at = existing.created_at;
        }
        preferences.updated_at = Utc::now();

        self.provider.set(preferences.clone())?;
        tracing::info!(
            key = %preferences.storage_key(),
            is_override = preferences.is_override,
            "Saved notification preferences"
        );
        Ok(preferences)
    }

    /// Delete the record for `(level, entity_id)`.
    ///
    /// User-level records are rejected with [`CoreError::Forbidden`] and the
    /// store is left untouched. Otherwise returns whether a record existed.
    pub fn delete_notification_preferences(
        &mut self,
        level: NotificationLevel,
        entity_id: &str,
    ) -> StoreResult<bool> {
        if level == NotificationLevel::User {
            tracing::warn!(entity_id, "Rejected deletion of user-level configuration");
            return Err(CoreError::Forbidden(USER_LEVEL_DELETE_ERROR.to_string()).into());
        }

        let existed = self.provider.delete(level, entity_id)?;
        tracing::info!(key = %storage_key(level, entity_id), existed, "Deleted notification preferences");
        Ok(existed)
    }

    /// Resolve the effective configuration for a context.
    pub fn resolve(&self, ctx: &ResolutionContext) -> EffectiveNotificationConfig {
        let resolved = resolve_notification_config(&self.provider, ctx);
        tracing::debug!(
            user_id = %ctx.user_id,
            source_level = %resolved.source.level,
            source_entity = %resolved.source.entity_id,
            is_default = resolved.source.is_default,
            override_count = resolved.overrides.len(),
            "Resolved notification configuration"
        );
        resolved
    }

    /// Resolve a context and report which levels hold a stored record.
    pub fn inspect(&self, ctx: &ResolutionContext) -> ConfigurationInspection {
        inspect_configuration(&self.provider, ctx)
    }

    /// Copy the record at `(parent_level, parent_entity)` into an override
    /// at `(level, entity_id)` and save it, replacing any record there.
    pub fn create_override(
        &mut self,
        parent_level: NotificationLevel,
        parent_entity: &str,
        level: NotificationLevel,
        entity_id: &str,
        reason: Option<String>,
    ) -> StoreResult<NotificationPreferences> {
        let parent = self
            .provider
            .get(parent_level, parent_entity)
            .ok_or_else(|| CoreError::NotFound {
                entity: "NotificationPreferences",
                id: storage_key(parent_level, parent_entity),
            })?;
        let child = create_override(parent, level, entity_id, reason);
        self.save_notification_preferences(child)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use assetwatch_core::config_provider::InMemoryConfigProvider;
    use assetwatch_core::notification_preferences::default_preferences;

    fn service_with_alice() -> NotificationConfigService<InMemoryConfigProvider> {
        let mut service = NotificationConfigService::new(InMemoryConfigProvider::new());
        service
            .save_notification_preferences(default_preferences("alice"))
            .unwrap();
        service
    }

    #[test]
    fn save_keeps_original_creation_time() {
        let mut service = service_with_alice();
        let first = service
            .get_notification_preferences(NotificationLevel::User, "alice")
            .cloned()
            .unwrap();

        let mut edited = default_preferences("alice");
        edited.channels.sms.enabled = true;
        let saved = service.save_notification_preferences(edited).unwrap();

        assert_eq!(saved.created_at, first.created_at);
        assert!(saved.updated_at >= first.updated_at);
        assert!(saved.channels.sms.enabled);
        assert_eq!(service.list().len(), 1);
    }

    #[test]
    fn delete_user_level_is_forbidden() {
        let mut service = service_with_alice();
        let err = service
            .delete_notification_preferences(NotificationLevel::User, "alice")
            .unwrap_err();
        assert_matches!(
            err,
            StoreError::Core(CoreError::Forbidden(ref msg)) if msg == USER_LEVEL_DELETE_ERROR
        );
        assert!(service
            .get_notification_preferences(NotificationLevel::User, "alice")
            .is_some());
    }

    #[test]
    fn create_override_requires_parent() {
        let mut service = service_with_alice();
        let err = service
            .create_override(
                NotificationLevel::Site,
                "SITE-404",
                NotificationLevel::Asset,
                "A-1",
                None,
            )
            .unwrap_err();
        assert_matches!(err, StoreError::Core(CoreError::NotFound { .. }));
    }

    #[test]
    fn create_override_saves_flagged_copy() {
        let mut service = service_with_alice();
        let child = service
            .create_override(
                NotificationLevel::User,
                "alice",
                NotificationLevel::Site,
                "SITE-1",
                Some("Depot night shift".into()),
            )
            .unwrap();

        assert!(child.is_override);
        let stored = service
            .get_notification_preferences(NotificationLevel::Site, "SITE-1")
            .unwrap();
        assert_eq!(stored.id, child.id);
        assert_eq!(stored.override_reason.as_deref(), Some("Depot night shift"));
    }
}
