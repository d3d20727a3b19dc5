use crate::models::{PersistedRow, DEFAULT_SOURCE, NOT_PROVIDED};

use super::validator::Validated;

const MAX_SOURCE_LENGTH: usize = 50;
const MAX_USER_AGENT_LENGTH: usize = 200;

/// The form an email takes in storage, and therefore the rate-limit key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Turn a validated request into the row that gets stored.
pub fn sanitize(validated: &Validated<'_>) -> PersistedRow {
    let req = validated.request;

    let email = req
        .identity()
        .map(normalize_email)
        .unwrap_or_else(|| NOT_PROVIDED.to_string());

    let interests = req
        .interests
        .as_deref()
        .unwrap_or_default()
        .replace(['<', '>'], "")
        .trim()
        .to_string();

    let language = req.language.as_deref().unwrap_or_default().trim().to_string();

    let source = req
        .source
        .as_deref()
        .map(|s| truncate(s.trim(), MAX_SOURCE_LENGTH).trim_end().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

    let user_agent = req
        .user_agent
        .as_deref()
        .filter(|ua| !ua.is_empty())
        .map(|ua| truncate(ua, MAX_USER_AGENT_LENGTH).to_string())
        .unwrap_or_else(|| NOT_PROVIDED.to_string());

    PersistedRow {
        timestamp: validated.submitted_at,
        email,
        interests,
        language,
        source,
        user_agent,
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
