//! Shared primitive type aliases.

/// Database row identifier.
pub type DbId = i64;

/// UTC timestamp stored in the database.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
