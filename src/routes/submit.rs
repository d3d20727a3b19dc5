use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};

use crate::error::SubmissionError;
use crate::state::SharedState;
use crate::submission::parser;

pub async fn submit(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, SubmissionError> {
    let mut req = parser::parse_submission(&headers, body)
        .await
        .map_err(SubmissionError::Malformed)?;

    // Fall back to the browser's own header when the form did not report one
    if req.user_agent.as_deref().is_none_or(str::is_empty) {
        req.user_agent = headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
    }

    state.handler.handle(&req).await?;

    Ok(Json(json!({
        "result": "success",
        "message": "Form submitted successfully",
    })))
}
