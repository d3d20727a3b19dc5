use serde::Deserialize;

/// A form submission exactly as the client sent it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub interests: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default, alias = "recaptchaToken")]
    pub bot_token: Option<String>,
}

impl SubmissionRequest {
    /// The email as an identity, if the submitter gave one.
    pub fn identity(&self) -> Option<&str> {
        self.email
            .as_deref()
            .filter(|e| !e.is_empty() && *e != super::NOT_PROVIDED)
    }

    pub fn bot_token(&self) -> Option<&str> {
        self.bot_token.as_deref().filter(|t| !t.is_empty())
    }
}
