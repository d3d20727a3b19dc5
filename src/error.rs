use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug)]
pub enum StoreError {
    Database(sqlx::Error),
    NoSheet,
    Other(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(err) => write!(f, "Database Error: {err}"),
            StoreError::NoSheet => write!(f, "No sheet available to store submissions"),
            StoreError::Other(msg) => write!(f, "Storage Error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

/// Why a submission was turned away.
#[derive(Debug)]
pub enum SubmissionError {
    Validation(&'static str),
    Verification,
    RateLimited,
    Malformed(String),
    Storage(StoreError),
}

impl SubmissionError {
    /// The reason shown to the client. Only validation reasons are specific.
    pub fn reason(&self) -> &'static str {
        match self {
            SubmissionError::Validation(reason) => *reason,
            SubmissionError::Verification => "verification failed",
            SubmissionError::RateLimited => "too many submissions",
            SubmissionError::Malformed(_) | SubmissionError::Storage(_) => "server error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            SubmissionError::Validation(_) | SubmissionError::Malformed(_) => {
                StatusCode::BAD_REQUEST
            }
            SubmissionError::Verification => StatusCode::FORBIDDEN,
            SubmissionError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            SubmissionError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionError::Validation(reason) => write!(f, "Invalid submission: {reason}"),
            SubmissionError::Verification => write!(f, "Bot verification failed"),
            SubmissionError::RateLimited => write!(f, "Rate limited"),
            SubmissionError::Malformed(msg) => write!(f, "Malformed body: {msg}"),
            SubmissionError::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SubmissionError {}

impl From<StoreError> for SubmissionError {
    fn from(err: StoreError) -> Self {
        SubmissionError::Storage(err)
    }
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        match &self {
            SubmissionError::Storage(err) => tracing::error!("Failed to store submission: {err}"),
            SubmissionError::Malformed(msg) => tracing::warn!("Unreadable submission body: {msg}"),
            other => tracing::info!("Submission rejected: {other}"),
        }

        let body = json!({ "result": "error", "error": self.reason() });
        (self.status(), axum::Json(body)).into_response()
    }
}

/// Reply used when a request handler panics.
pub fn panic_response(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Request handler panicked: {detail}");

    let body = json!({ "result": "error", "error": "server error" });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
}
