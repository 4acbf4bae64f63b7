//! Domain logic for asset-alert notification preferences.
//!
//! Everything here is pure and synchronous: record types, the
//! [`ConfigProvider`](config_provider::ConfigProvider) seam, override
//! resolution across user, site, asset and job levels, inspection, and
//! alert delivery decisions. Persistence lives in `assetwatch-store`.

pub mod alert_routing;
pub mod channels;
pub mod config_inspection;
pub mod config_provider;
pub mod config_resolution;
pub mod error;
pub mod notification_level;
pub mod notification_preferences;
pub mod override_diff;
pub mod types;
