/// Identifiers of users, sites, assets and jobs are opaque strings
/// (e.g. `"alice"`, `"SITE-1"`).
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
