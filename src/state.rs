use std::sync::Arc;

use crate::clock::Clock;
use crate::config::Config;
use crate::recaptcha::BotVerifier;
use crate::store::SheetStore;
use crate::submission::SubmissionHandler;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub handler: SubmissionHandler,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn SheetStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, String> {
        let verifier = BotVerifier::new(config.recaptcha.clone())?;
        let handler = SubmissionHandler::new(
            config.policy.clone(),
            verifier,
            store,
            clock,
            config.sheet_name.clone(),
        );
        Ok(Self { config, handler })
    }
}
