//! Application state shared by all handlers

use std::sync::Arc;
use std::time::Duration;

use crate::captcha::{BotVerifier, RecaptchaVerifier};
use crate::config::Config;
use crate::error::ServiceResult;
use crate::rate_limit::RateLimiter;
use crate::rsvp::RsvpService;
use crate::sheets::{GuestStore, SheetStore};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RsvpService>,
    /// Limiter for the submission route
    pub rate_limiter: RateLimiter,
    /// Submissions allowed per client IP per minute
    pub submit_rate_limit: u32,
    /// Public reCAPTCHA key served to the page
    pub site_key: String,
    /// Action name the page must request tokens for
    pub recaptcha_action: String,
}

impl AppState {
    pub fn new(service: Arc<RsvpService>, config: &Config) -> Self {
        Self {
            service,
            rate_limiter: RateLimiter::new(),
            submit_rate_limit: config.submit_rate_limit,
            site_key: config.recaptcha.site_key.clone(),
            recaptcha_action: config.recaptcha.expected_action.clone(),
        }
    }

    /// Wire the production verifier and store from configuration
    pub fn from_config(config: &Config) -> ServiceResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        let verifier: Arc<dyn BotVerifier> =
            Arc::new(RecaptchaVerifier::new(&config.recaptcha, http.clone()));
        let store: Arc<dyn GuestStore> = Arc::new(SheetStore::from_config(&config.sheets, http));

        let service = RsvpService::new(
            verifier,
            store,
            config.sheets.guests_sheet_name.clone(),
            config.sheets.photo_sheet_name.clone(),
        );
        Ok(Self::new(Arc::new(service), config))
    }
}
