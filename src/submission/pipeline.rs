use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::config::SubmissionPolicy;
use crate::error::SubmissionError;
use crate::models::{PersistedRow, SubmissionRequest};
use crate::rate_limit::RateLimiter;
use crate::recaptcha::BotVerifier;
use crate::store::{self, Sheet, SheetStore};

use super::sanitizer::{normalize_email, sanitize};
use super::validator::validate;

/// Runs one submission through validation, bot verification, rate limiting
/// and sanitizing, then appends it to the sheet.
pub struct SubmissionHandler {
    policy: SubmissionPolicy,
    limiter: RateLimiter,
    verifier: BotVerifier,
    store: Arc<dyn SheetStore>,
    clock: Arc<dyn Clock>,
    sheet_name: String,
}

impl SubmissionHandler {
    pub fn new(
        policy: SubmissionPolicy,
        verifier: BotVerifier,
        store: Arc<dyn SheetStore>,
        clock: Arc<dyn Clock>,
        sheet_name: impl Into<String>,
    ) -> Self {
        Self {
            limiter: RateLimiter::from_policy(&policy),
            policy,
            verifier,
            store,
            clock,
            sheet_name: sheet_name.into(),
        }
    }

    /// Returns the stored row on acceptance.
    pub async fn handle(&self, req: &SubmissionRequest) -> Result<PersistedRow, SubmissionError> {
        let now = self.clock.now();

        let validated = validate(req, &self.policy, now)?;

        if let Some(token) = req.bot_token() {
            if self.verifier.is_enabled() && !self.verifier.verify(Some(token)).await {
                return Err(SubmissionError::Verification);
            }
        }

        let sheet = store::resolve_sheet(self.store.as_ref(), &self.sheet_name).await?;

        if !self.check_rate_limit(&sheet, req.identity(), now).await? {
            return Err(SubmissionError::RateLimited);
        }

        let row = sanitize(&validated);
        self.store.append_row(&sheet, &row).await?;

        tracing::info!(
            "Stored submission in '{}' (language={}, source={}, email={})",
            sheet.name,
            row.language,
            row.source,
            redact(&row.email)
        );

        Ok(row)
    }

    /// Anonymous submissions are never limited: there is nothing to key on.
    async fn check_rate_limit(
        &self,
        sheet: &Sheet,
        email: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<bool, SubmissionError> {
        let Some(email) = email else {
            return Ok(true);
        };

        let rows = self.store.read_all_rows(sheet).await?;
        Ok(self.limiter.allows(&normalize_email(email), &rows, now))
    }
}

/// Keep only the domain of an email for logs.
fn redact(email: &str) -> String {
    match email.split_once('@') {
        Some((_, domain)) => format!("***@{domain}"),
        None => email.to_string(),
    }
}
