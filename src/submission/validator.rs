use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use regex::Regex;

use crate::config::SubmissionPolicy;
use crate::error::SubmissionError;
use crate::models::SubmissionRequest;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// How far in the past a client timestamp may lie.
const MAX_TIMESTAMP_AGE_HOURS: i64 = 1;

/// A request that passed every check, with its timestamp already parsed.
#[derive(Debug)]
pub struct Validated<'a> {
    pub request: &'a SubmissionRequest,
    pub submitted_at: DateTime<Utc>,
}

/// Check a raw request. The first failing rule decides the reason.
pub fn validate<'a>(
    req: &'a SubmissionRequest,
    policy: &SubmissionPolicy,
    now: DateTime<Utc>,
) -> Result<Validated<'a>, SubmissionError> {
    let (Some(interests), Some(language), Some(timestamp)) = (
        non_empty(&req.interests),
        non_empty(&req.language),
        non_empty(&req.timestamp),
    ) else {
        return Err(SubmissionError::Validation("missing required fields"));
    };

    if let Some(email) = req.identity() {
        if !EMAIL_RE.is_match(email) {
            return Err(SubmissionError::Validation("invalid email format"));
        }
        if email.chars().count() > policy.max_email_length {
            return Err(SubmissionError::Validation("email too long"));
        }
    }

    if interests.chars().count() > policy.max_interests_length {
        return Err(SubmissionError::Validation("interests too long"));
    }

    if !policy.allowed_languages.iter().any(|l| l == language) {
        return Err(SubmissionError::Validation("invalid language"));
    }

    let submitted_at =
        parse_timestamp(timestamp).ok_or(SubmissionError::Validation("invalid timestamp"))?;
    if submitted_at < now - Duration::hours(MAX_TIMESTAMP_AGE_HOURS) || submitted_at > now {
        return Err(SubmissionError::Validation("invalid timestamp"));
    }

    Ok(Validated {
        request: req,
        submitted_at,
    })
}

/// Zone-less forms, read as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Accepts RFC 3339 (what `Date.prototype.toISOString` produces), RFC 2822,
/// and ISO date-times without an offset.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
    {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn request() -> SubmissionRequest {
        SubmissionRequest {
            email: Some("alice@example.com".to_string()),
            interests: Some("rust, databases".to_string()),
            language: Some("en".to_string()),
            timestamp: Some(now().to_rfc3339()),
            ..Default::default()
        }
    }

    fn reason(req: &SubmissionRequest) -> Option<&'static str> {
        match validate(req, &SubmissionPolicy::default(), now()) {
            Ok(_) => None,
            Err(err) => Some(err.reason()),
        }
    }

    #[test]
    fn accepts_complete_request() {
        let req = request();
        let validated = validate(&req, &SubmissionPolicy::default(), now()).unwrap();
        assert_eq!(validated.submitted_at, now());
    }

    #[test]
    fn missing_required_fields() {
        let strips: [fn(&mut SubmissionRequest); 3] = [
            |r| r.interests = None,
            |r| r.language = Some(String::new()),
            |r| r.timestamp = None,
        ];
        for strip in strips {
            let mut req = request();
            strip(&mut req);
            assert_eq!(reason(&req), Some("missing required fields"));
        }
    }

    #[test]
    fn email_is_optional() {
        let mut req = request();
        req.email = None;
        assert_eq!(reason(&req), None);

        req.email = Some("not provided".to_string());
        assert_eq!(reason(&req), None);

        req.email = Some(String::new());
        assert_eq!(reason(&req), None);
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in ["plainaddress", "@example.com", "a@b", "a b@c.com", "a@@b.com", " a@b.com"] {
            let mut req = request();
            req.email = Some(email.to_string());
            assert_eq!(reason(&req), Some("invalid email format"), "{email}");
        }
    }

    #[test]
    fn email_length_limit() {
        let domain = "@example.com";
        let mut req = request();

        req.email = Some(format!("{}{domain}", "a".repeat(254 - domain.len())));
        assert_eq!(reason(&req), None);

        req.email = Some(format!("{}{domain}", "a".repeat(255 - domain.len())));
        assert_eq!(reason(&req), Some("email too long"));
    }

    #[test]
    fn interests_length_limit() {
        let mut req = request();

        req.interests = Some("x".repeat(500));
        assert_eq!(reason(&req), None);

        req.interests = Some("x".repeat(501));
        assert_eq!(reason(&req), Some("interests too long"));
    }

    #[test]
    fn language_must_be_allowed() {
        let mut req = request();
        req.language = Some("pt".to_string());
        assert_eq!(reason(&req), None);

        for language in ["fr", "EN", " en"] {
            req.language = Some(language.to_string());
            assert_eq!(reason(&req), Some("invalid language"), "{language}");
        }
    }

    #[test]
    fn timestamp_window() {
        let mut req = request();

        req.timestamp = Some((now() - Duration::minutes(59)).to_rfc3339());
        assert_eq!(reason(&req), None);

        req.timestamp = Some((now() - Duration::hours(1)).to_rfc3339());
        assert_eq!(reason(&req), None);

        req.timestamp = Some((now() - Duration::minutes(61)).to_rfc3339());
        assert_eq!(reason(&req), Some("invalid timestamp"));

        req.timestamp = Some((now() + Duration::seconds(1)).to_rfc3339());
        assert_eq!(reason(&req), Some("invalid timestamp"));

        req.timestamp = Some("yesterday".to_string());
        assert_eq!(reason(&req), Some("invalid timestamp"));
    }

    #[test]
    fn first_failure_wins() {
        let mut req = request();
        req.email = Some("broken".to_string());
        req.language = Some("fr".to_string());
        assert_eq!(reason(&req), Some("invalid email format"));
    }

    #[test]
    fn parses_common_timestamp_formats() {
        assert_eq!(parse_timestamp("2026-03-01T12:00:00.000Z"), Some(now()));
        assert_eq!(parse_timestamp("2026-03-01T13:00:00+01:00"), Some(now()));
        assert_eq!(parse_timestamp("Sun, 01 Mar 2026 12:00:00 +0000"), Some(now()));
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn zone_less_timestamps_are_utc() {
        assert_eq!(parse_timestamp("2026-03-01T12:00:00"), Some(now()));
        assert_eq!(parse_timestamp("2026-03-01T12:00:00.000"), Some(now()));
        assert_eq!(parse_timestamp("2026-03-01 12:00:00"), Some(now()));
        assert_eq!(parse_timestamp("2026-03-01"), None);

        let mut req = request();
        req.timestamp = Some("2026-03-01T11:30:00".to_string());
        assert_eq!(reason(&req), None);
    }
}
