use chrono::{DateTime, Utc};

/// Column titles, in storage order.
pub const COLUMNS: [&str; 6] = [
    "Timestamp",
    "Email",
    "Interests",
    "Language",
    "Source",
    "User Agent",
];

/// One accepted submission as stored in the sheet. Rows are append-only.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PersistedRow {
    pub timestamp: DateTime<Utc>,
    pub email: String,
    pub interests: String,
    pub language: String,
    pub source: String,
    pub user_agent: String,
}
