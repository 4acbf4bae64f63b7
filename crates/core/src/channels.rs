//! Well-known notification channel names and the [`Channel`] enum.
//!
//! The string constants match the keys of the `channels` object in a
//! persisted preference record and the values reported by alert routing.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Email delivery to the configured addresses.
pub const CHANNEL_EMAIL: &str = "email";

/// SMS delivery to the configured phone numbers.
pub const CHANNEL_SMS: &str = "sms";

/// Mobile push delivery to the registered devices.
pub const CHANNEL_PUSH: &str = "push";

/// Webhook delivery to external HTTP endpoints.
pub const CHANNEL_WEBHOOK: &str = "webhook";

pub const ALL_CHANNELS: &[&str] = &[CHANNEL_EMAIL, CHANNEL_SMS, CHANNEL_PUSH, CHANNEL_WEBHOOK];

/// A delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
    Push,
    Webhook,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => CHANNEL_EMAIL,
            Self::Sms => CHANNEL_SMS,
            Self::Push => CHANNEL_PUSH,
            Self::Webhook => CHANNEL_WEBHOOK,
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            CHANNEL_EMAIL => Ok(Self::Email),
            CHANNEL_SMS => Ok(Self::Sms),
            CHANNEL_PUSH => Ok(Self::Push),
            CHANNEL_WEBHOOK => Ok(Self::Webhook),
            _ => Err(CoreError::Validation(format!(
                "Invalid channel: '{s}'. Must be one of: {}",
                ALL_CHANNELS.join(", ")
            ))),
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
