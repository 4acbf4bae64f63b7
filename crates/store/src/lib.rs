//! Persistence and service layer for notification preferences.
//!
//! - [`JsonFileConfigProvider`] keeps the whole configuration map as one
//!   JSON document on disk and writes through on every mutation.
//! - [`NotificationConfigService`] is the facade consumers call to read,
//!   save, delete, resolve and inspect configurations over any
//!   [`ConfigProvider`](assetwatch_core::config_provider::ConfigProvider).

pub mod error;
pub mod json_file;
pub mod service;

pub use error::{StoreError, StoreResult};
pub use json_file::{decode_config_map, encode_config_map, JsonFileConfigProvider, DEFAULT_STORE_FILE};
pub use service::{NotificationConfigService, USER_LEVEL_DELETE_ERROR};
