use serde::Deserialize;

use crate::config::RecaptchaConfig;

/// What the siteverify endpoint answers with.
#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Scores client tokens against the bot-verification service.
///
/// Verification is skipped when no secret is configured or the client sent
/// no token. Once a call is made, any transport or decoding failure counts
/// as a failed verification.
pub struct BotVerifier {
    client: reqwest::Client,
    config: RecaptchaConfig,
}

impl BotVerifier {
    pub fn new(config: RecaptchaConfig) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| format!("Failed to build verification client: {e}"))?;
        Ok(Self { client, config })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    pub async fn verify(&self, token: Option<&str>) -> bool {
        let secret = match self.config.secret.as_deref() {
            Some(secret) if !secret.is_empty() => secret,
            _ => return true,
        };
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return true;
        };

        match self.site_verify(secret, token).await {
            Ok(result) => {
                let passed = result.success
                    && result.score.is_some_and(|score| score >= self.config.min_score);
                if !passed {
                    tracing::warn!(
                        "Bot verification rejected token: success={}, score={:?}, errors={:?}",
                        result.success,
                        result.score,
                        result.error_codes
                    );
                }
                passed
            }
            Err(e) => {
                tracing::warn!("Bot verification request failed: {e}");
                false
            }
        }
    }

    async fn site_verify(&self, secret: &str, token: &str) -> Result<SiteVerifyResponse, reqwest::Error> {
        self.client
            .post(&self.config.verify_url)
            .form(&[("secret", secret), ("response", token)])
            .send()
            .await?
            .error_for_status()?
            .json::<SiteVerifyResponse>()
            .await
    }
}
