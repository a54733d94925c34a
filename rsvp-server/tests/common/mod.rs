//! Test doubles for the verifier and the guest store
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rsvp_server::captcha::{BotVerifier, SiteVerifyResponse, Verification, evaluate};
use rsvp_server::config::{Config, EXPECTED_ACTION};
use rsvp_server::sheets::{GuestStore, Row, SheetsError};
use rsvp_server::{AppState, RsvpService};
use serde_json::{Value, json};

/// Feeds a canned `siteverify` response through the real acceptance policy
pub struct ScriptedVerifier {
    response: SiteVerifyResponse,
    pub calls: AtomicUsize,
    pub tokens: Mutex<Vec<String>>,
}

impl ScriptedVerifier {
    pub fn with_score(score: f64) -> Self {
        Self::new(SiteVerifyResponse {
            success: true,
            score: Some(score),
            action: Some(EXPECTED_ACTION.to_string()),
            ..Default::default()
        })
    }

    pub fn new(response: SiteVerifyResponse) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            tokens: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BotVerifier for ScriptedVerifier {
    async fn verify(&self, token: &str) -> Verification {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().unwrap().push(token.to_string());
        evaluate(&self.response, 0.5, EXPECTED_ACTION)
    }
}

pub struct PanickingVerifier;

#[async_trait]
impl BotVerifier for PanickingVerifier {
    async fn verify(&self, _token: &str) -> Verification {
        panic!("verifier exploded");
    }
}

pub struct AppendCall {
    pub sheet: String,
    pub header: Vec<String>,
    pub rows: Vec<Row>,
}

/// Records every append instead of talking to a spreadsheet
#[derive(Default)]
pub struct RecordingStore {
    pub appends: Mutex<Vec<AppendCall>>,
    pub photo_link: String,
    pub fail_appends: bool,
}

impl RecordingStore {
    pub fn append_count(&self) -> usize {
        self.appends.lock().unwrap().len()
    }
}

#[async_trait]
impl GuestStore for RecordingStore {
    async fn get_single_cell(&self, _sheet: &str, _cell: &str) -> String {
        self.photo_link.clone()
    }

    async fn append_rows(
        &self,
        sheet: &str,
        header: &[&str],
        rows: Vec<Row>,
    ) -> Result<(), SheetsError> {
        if self.fail_appends {
            return Err(SheetsError::Api {
                status: 503,
                body: "The service is currently unavailable.".into(),
            });
        }
        self.appends.lock().unwrap().push(AppendCall {
            sheet: sheet.to_string(),
            header: header.iter().map(|h| h.to_string()).collect(),
            rows,
        });
        Ok(())
    }
}

pub fn service(verifier: Arc<dyn BotVerifier>, store: Arc<dyn GuestStore>) -> RsvpService {
    RsvpService::new(verifier, store, "guests", "photo")
}

pub fn app_state(service: RsvpService, submit_rate_limit: u32) -> AppState {
    let limit = submit_rate_limit.to_string();
    let config = Config::from_lookup(|name| match name {
        "RECAPTCHA_SITE_KEY" => Some("public-site-key".into()),
        "SUBMIT_RATE_LIMIT" => Some(limit.clone()),
        _ => None,
    });
    AppState::new(Arc::new(service), &config)
}

/// One attending guest, valid token, empty honeypot
pub fn valid_payload() -> Value {
    json!({
        "guests": [{
            "name": "Иванов Иван",
            "phoneNumber": "+79991234567",
            "attendance": "yes",
            "alcoholPreference": ["champagne", "wine"],
            "housingRequired": "yes"
        }],
        "message": "",
        "secretNotes": "",
        "recaptchaToken": "token-from-widget"
    })
}
