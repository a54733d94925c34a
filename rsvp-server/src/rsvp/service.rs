//! RSVP submission pipeline: validate → verify → honeypot → store

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::SubmissionResult;
use shared::validation::{self, MSG_VALIDATION_FAILED, RsvpSubmission};

use super::format::{HEADER_ROW, guest_rows, submission_timestamp};
use crate::captcha::{BotVerifier, Rejection};
use crate::sheets::{GuestStore, SheetsError};

pub const MSG_SAVE_FAILED: &str = "Не удалось сохранить данные RSVP. Попробуйте позже.";
pub const MSG_UNEXPECTED: &str = "Произошла ошибка при отправке вашего ответа.";

/// Cell holding the photo-album link on the photo sheet
const PHOTO_LINK_CELL: &str = "A2";

pub struct RsvpService {
    verifier: Arc<dyn BotVerifier>,
    store: Arc<dyn GuestStore>,
    guests_sheet: String,
    photo_sheet: String,
}

impl RsvpService {
    pub fn new(
        verifier: Arc<dyn BotVerifier>,
        store: Arc<dyn GuestStore>,
        guests_sheet: impl Into<String>,
        photo_sheet: impl Into<String>,
    ) -> Self {
        Self {
            verifier,
            store,
            guests_sheet: guests_sheet.into(),
            photo_sheet: photo_sheet.into(),
        }
    }

    /// Run one submission and report `{ success, error? }`
    pub async fn submit(&self, payload: serde_json::Value) -> SubmissionResult {
        match self.submit_checked(payload, Utc::now()).await {
            Ok(()) => SubmissionResult::ok(),
            Err(e) => SubmissionResult::failed(e.message),
        }
    }

    /// Like [`submit`](Self::submit) but keeps the error code, with an
    /// explicit submission time. Panics inside the pipeline are reported as
    /// an internal error.
    pub async fn submit_checked(
        &self,
        payload: serde_json::Value,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        match AssertUnwindSafe(self.run(payload, now)).catch_unwind().await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!("RSVP submission panicked");
                Err(AppError::with_message(ErrorCode::InternalError, MSG_UNEXPECTED))
            }
        }
    }

    async fn run(&self, payload: serde_json::Value, now: DateTime<Utc>) -> AppResult<()> {
        let submission: RsvpSubmission = serde_json::from_value(payload).map_err(|e| {
            tracing::warn!(error = %e, "Malformed RSVP payload");
            AppError::validation(MSG_VALIDATION_FAILED)
        })?;

        let request = validation::validate_submission(&submission).map_err(|failure| {
            tracing::warn!(%failure, "RSVP validation failed");
            AppError::from(failure)
        })?;

        let verification = self.verifier.verify(&request.verification_token).await;
        if !verification.accepted {
            let rejection = verification
                .rejection
                .unwrap_or_else(|| Rejection::Internal("rejected without reason".into()));
            return Err(AppError::with_message(
                rejection.error_code(),
                rejection.user_message(),
            ));
        }
        tracing::info!(score = ?verification.score, "reCAPTCHA passed");

        if request.is_honeypot_filled() {
            tracing::warn!(
                guests = request.guests.len(),
                "Honeypot field filled, dropping submission"
            );
            return Ok(());
        }

        let timestamp = submission_timestamp(now);
        let rows = guest_rows(&request.guests, request.message.as_deref(), &timestamp);

        self.store
            .append_rows(&self.guests_sheet, &HEADER_ROW, rows)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, sheet = %self.guests_sheet, "Failed to save RSVP");
                let code = match e {
                    SheetsError::NotConfigured => ErrorCode::StoreNotConfigured,
                    _ => ErrorCode::StoreWriteFailed,
                };
                AppError::with_message(code, MSG_SAVE_FAILED)
            })?;

        tracing::info!(guests = request.guests.len(), "RSVP saved");
        Ok(())
    }

    /// Link to the shared photo album, `""` when it cannot be read
    pub async fn photo_album_link(&self) -> String {
        self.store
            .get_single_cell(&self.photo_sheet, PHOTO_LINK_CELL)
            .await
    }
}
