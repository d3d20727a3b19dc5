use chrono::{DateTime, Duration, Utc};

use crate::config::SubmissionPolicy;
use crate::models::PersistedRow;

/// Per-email submission limiter using a sliding window over stored rows.
///
/// Nothing is kept between calls: the window is recomputed from the sheet
/// every time. Rows must be in non-decreasing timestamp order, oldest first;
/// the scan walks backwards from the newest row and stops at the first row
/// older than the window. A row appended out of order can hide older rows
/// that are still inside the window.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    window: Duration,
    max_per_window: usize,
}

impl RateLimiter {
    pub fn new(window: Duration, max_per_window: usize) -> Self {
        Self {
            window,
            max_per_window,
        }
    }

    pub fn from_policy(policy: &SubmissionPolicy) -> Self {
        Self::new(policy.rate_limit_window, policy.max_submissions_per_window)
    }

    /// Rows for `email` within the window ending at `now`. A window reaching
    /// past the earliest representable time covers every row.
    pub fn count_recent(&self, email: &str, rows: &[PersistedRow], now: DateTime<Utc>) -> usize {
        let cutoff = now.checked_sub_signed(self.window);

        rows.iter()
            .rev()
            .take_while(|row| cutoff.is_none_or(|cutoff| row.timestamp >= cutoff))
            .filter(|row| row.email == email)
            .count()
    }

    /// Check if another submission from `email` is allowed. `email` must
    /// already be in stored (normalized) form.
    pub fn allows(&self, email: &str, rows: &[PersistedRow], now: DateTime<Utc>) -> bool {
        self.count_recent(email, rows, now) < self.max_per_window
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn row(email: &str, minutes_ago: i64) -> PersistedRow {
        PersistedRow {
            timestamp: now() - Duration::minutes(minutes_ago),
            email: email.to_string(),
            interests: "x".to_string(),
            language: "en".to_string(),
            source: "direct".to_string(),
            user_agent: "not provided".to_string(),
        }
    }

    fn limiter() -> RateLimiter {
        RateLimiter::new(Duration::minutes(5), 3)
    }

    #[test]
    fn allows_below_the_limit() {
        let rows = vec![row("e@x.com", 4), row("e@x.com", 1)];
        assert!(limiter().allows("e@x.com", &rows, now()));
    }

    #[test]
    fn rejects_at_the_limit() {
        let rows = vec![row("e@x.com", 3), row("e@x.com", 2), row("e@x.com", 1)];
        assert!(!limiter().allows("e@x.com", &rows, now()));
    }

    #[test]
    fn ignores_rows_outside_the_window() {
        let rows = vec![row("e@x.com", 30), row("e@x.com", 20), row("e@x.com", 10)];
        assert!(limiter().allows("e@x.com", &rows, now()));
    }

    #[test]
    fn row_exactly_at_cutoff_counts() {
        let rows = vec![row("e@x.com", 5), row("e@x.com", 2), row("e@x.com", 1)];
        assert_eq!(limiter().count_recent("e@x.com", &rows, now()), 3);
    }

    #[test]
    fn only_counts_matching_email() {
        let rows = vec![
            row("other@x.com", 3),
            row("e@x.com", 2),
            row("other@x.com", 1),
            row("E@x.com", 1),
        ];
        assert_eq!(limiter().count_recent("e@x.com", &rows, now()), 1);
    }

    #[test]
    fn stops_at_first_stale_row() {
        // An out-of-order row hides the in-window row stored before it.
        let rows = vec![row("e@x.com", 1), row("e@x.com", 10), row("e@x.com", 2)];
        assert_eq!(limiter().count_recent("e@x.com", &rows, now()), 1);
    }

    #[test]
    fn huge_window_counts_every_row() {
        let limiter = RateLimiter::new(Duration::MAX, 3);
        let rows = vec![row("e@x.com", 60 * 24 * 365), row("e@x.com", 90), row("e@x.com", 1)];

        assert_eq!(limiter.count_recent("e@x.com", &rows, now()), 3);
        assert!(!limiter.allows("e@x.com", &rows, now()));
        assert!(limiter.allows("e@x.com", &[], now()));
    }

    #[test]
    fn empty_sheet_allows() {
        assert!(limiter().allows("e@x.com", &[], now()));
    }
}
