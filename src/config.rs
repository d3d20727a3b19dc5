use std::net::IpAddr;
use std::time::Duration;

const DEFAULT_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub storage: StorageBackend,
    pub sheet_name: String,
    pub policy: SubmissionPolicy,
    pub recaptcha: RecaptchaConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    Memory,
    Postgres { database_url: String },
}

/// Limits applied to every submission.
#[derive(Debug, Clone)]
pub struct SubmissionPolicy {
    pub max_email_length: usize,
    pub max_interests_length: usize,
    pub allowed_languages: Vec<String>,
    pub rate_limit_window: chrono::Duration,
    pub max_submissions_per_window: usize,
}

impl Default for SubmissionPolicy {
    fn default() -> Self {
        Self {
            max_email_length: 254,
            max_interests_length: 500,
            allowed_languages: vec!["en".to_string(), "pt".to_string()],
            rate_limit_window: chrono::Duration::minutes(5),
            max_submissions_per_window: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecaptchaConfig {
    /// Empty or absent disables verification.
    pub secret: Option<String>,
    pub min_score: f64,
    pub verify_url: String,
    pub timeout: Duration,
}

impl RecaptchaConfig {
    pub fn disabled() -> Self {
        Self {
            secret: None,
            min_score: 0.5,
            verify_url: DEFAULT_VERIFY_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.as_deref().is_some_and(|s| !s.is_empty())
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host: IpAddr = env_or("FORMSHEET_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid FORMSHEET_HOST: {e}"))?;

        let port: u16 = env_or("FORMSHEET_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid FORMSHEET_PORT: {e}"))?;

        let max_body_size: usize = env_or("FORMSHEET_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid FORMSHEET_MAX_BODY_SIZE: {e}"))?;

        let cors_origins: Vec<String> = env_or("FORMSHEET_CORS_ORIGINS", "")
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();

        let log_level = env_or("FORMSHEET_LOG_LEVEL", "info");

        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        let default_storage = if database_url.is_some() { "postgres" } else { "memory" };
        let storage = match env_or("FORMSHEET_STORAGE", default_storage).as_str() {
            "memory" => StorageBackend::Memory,
            "postgres" => StorageBackend::Postgres {
                database_url: database_url.ok_or_else(|| {
                    "Missing required environment variable: DATABASE_URL".to_string()
                })?,
            },
            other => return Err(format!("Invalid FORMSHEET_STORAGE: {other}")),
        };

        let sheet_name = env_or("FORMSHEET_SHEET_NAME", "Submissions");

        let defaults = SubmissionPolicy::default();
        let rate_limit_window =
            parse_window_minutes(&env_or("FORMSHEET_RATE_LIMIT_MINUTES", "5"))?;
        let max_submissions_per_window: usize = env_or("FORMSHEET_RATE_LIMIT_MAX", "3")
            .parse()
            .map_err(|e| format!("Invalid FORMSHEET_RATE_LIMIT_MAX: {e}"))?;

        let policy = SubmissionPolicy {
            rate_limit_window,
            max_submissions_per_window,
            ..defaults
        };

        let min_score: f64 = env_or("RECAPTCHA_MIN_SCORE", "0.5")
            .parse()
            .map_err(|e| format!("Invalid RECAPTCHA_MIN_SCORE: {e}"))?;
        if !(0.0..=1.0).contains(&min_score) {
            return Err("Invalid RECAPTCHA_MIN_SCORE: must be between 0.0 and 1.0".to_string());
        }
        let timeout_secs: u64 = env_or("RECAPTCHA_TIMEOUT_SECS", "10")
            .parse()
            .map_err(|e| format!("Invalid RECAPTCHA_TIMEOUT_SECS: {e}"))?;

        let recaptcha = RecaptchaConfig {
            secret: std::env::var("RECAPTCHA_SECRET_KEY")
                .ok()
                .filter(|s| !s.is_empty()),
            min_score,
            verify_url: env_or("RECAPTCHA_VERIFY_URL", DEFAULT_VERIFY_URL),
            timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Config {
            host,
            port,
            max_body_size,
            cors_origins,
            log_level,
            storage,
            sheet_name,
            policy,
            recaptcha,
        })
    }
}

/// Longest rate-limit window accepted: one week.
const MAX_WINDOW_MINUTES: i64 = 7 * 24 * 60;

fn parse_window_minutes(raw: &str) -> Result<chrono::Duration, String> {
    let minutes: i64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("Invalid FORMSHEET_RATE_LIMIT_MINUTES: {e}"))?;
    if !(1..=MAX_WINDOW_MINUTES).contains(&minutes) {
        return Err(format!(
            "Invalid FORMSHEET_RATE_LIMIT_MINUTES: must be between 1 and {MAX_WINDOW_MINUTES}"
        ));
    }
    chrono::Duration::try_minutes(minutes)
        .ok_or_else(|| "Invalid FORMSHEET_RATE_LIMIT_MINUTES: out of range".to_string())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
