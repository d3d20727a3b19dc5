mod row;
mod submission;

pub use row::{PersistedRow, COLUMNS};
pub use submission::SubmissionRequest;

/// Stored in place of an absent optional field.
pub const NOT_PROVIDED: &str = "not provided";

/// Stored when the client reports no traffic source.
pub const DEFAULT_SOURCE: &str = "direct";
