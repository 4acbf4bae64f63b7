use crate::types::EntityId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound {
        entity: &'static str,
        id: EntityId,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_not_found() {
        let err = CoreError::NotFound {
            entity: "NotificationPreferences",
            id: "site:SITE-1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Entity not found: NotificationPreferences with id site:SITE-1"
        );
    }

    #[test]
    fn display_forbidden_keeps_message() {
        let err = CoreError::Forbidden("Cannot delete user-level configuration".into());
        assert_eq!(
            err.to_string(),
            "Forbidden: Cannot delete user-level configuration"
        );
    }
}
