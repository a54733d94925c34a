//! RSVP payload validation
//!
//! Two layers share the same guest rules:
//! - [`validate_form`]: interactive feedback while the guest fills the form
//!   (no verification token involved)
//! - [`validate_submission`]: the privileged layer run before bot
//!   verification, which additionally requires the token
//!
//! Per-field checks are declared with `validator`; the cross-field rule
//! (attending guests must answer the housing question) runs afterwards as a
//! refinement step. Errors carry the form path of the offending field, e.g.
//! `guests.0.housingRequired`, so the page can highlight it.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::{AppError, ErrorCode};
use crate::models::{Attendance, GuestEntry, HousingChoice, SubmissionRequest};

// ── Limits ──────────────────────────────────────────────────────────

/// Guest full name, in characters
pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 100;

// ── User-facing messages ────────────────────────────────────────────

pub const MSG_NAME_REQUIRED: &str = "Пожалуйста, укажите ФИО.";
pub const MSG_NAME_TOO_LONG: &str = "Слишком длинное значение.";
pub const MSG_PHONE_REQUIRED: &str = "Пожалуйста, укажите номер телефона.";
pub const MSG_ATTENDANCE_REQUIRED: &str = "Пожалуйста, выберите один из вариантов.";
pub const MSG_HOUSING_REQUIRED: &str = "Пожалуйста, выберите вариант по жилью.";
pub const MSG_GUESTS_EMPTY: &str = "Добавьте хотя бы одного гостя.";
pub const MSG_MESSAGE_TOO_LONG: &str = "Сообщение слишком длинное.";
pub const MSG_TOKEN_REQUIRED: &str = "Токен reCAPTCHA обязателен.";
pub const MSG_VALIDATION_FAILED: &str = "Ошибка валидации данных. Проверьте введенные значения.";

/// Form path of the verification token field
pub const TOKEN_PATH: &str = "recaptchaToken";

// ── Raw payload ─────────────────────────────────────────────────────

/// One guest as posted by the form, before normalization
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RawGuest {
    #[validate(custom(function = "validate_guest_name"))]
    pub name: String,
    #[validate(length(min = 1, message = "Пожалуйста, укажите номер телефона."))]
    pub phone_number: String,
    #[validate(required(message = "Пожалуйста, выберите один из вариантов."))]
    pub attendance: Option<String>,
    pub alcohol_preference: Option<Vec<String>>,
    pub housing_required: Option<String>,
}

/// The form fields shared by both validation layers
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RsvpForm {
    #[validate(nested)]
    pub guests: Vec<RawGuest>,
    #[validate(length(max = 500, message = "Сообщение слишком длинное."))]
    pub message: Option<String>,
    /// Honeypot
    pub secret_notes: Option<String>,
}

/// Full submission payload: the form plus the verification token
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RsvpSubmission {
    #[serde(flatten)]
    pub form: RsvpForm,
    #[validate(
        required(message = "Токен reCAPTCHA обязателен."),
        length(min = 1, message = "Токен reCAPTCHA обязателен.")
    )]
    pub recaptcha_token: Option<String>,
}

fn validate_guest_name(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    if len < NAME_MIN_LEN {
        return Err(
            ValidationError::new("name_too_short").with_message(Cow::Borrowed(MSG_NAME_REQUIRED)),
        );
    }
    if len > NAME_MAX_LEN {
        return Err(
            ValidationError::new("name_too_long").with_message(Cow::Borrowed(MSG_NAME_TOO_LONG)),
        );
    }
    Ok(())
}

// ── Errors ──────────────────────────────────────────────────────────

/// A single field-scoped problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Form path, e.g. `guests.1.name`
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Every field-level problem found in one payload, sorted by path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    errors: Vec<FieldError>,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect();
        write!(f, "validation failed ({})", parts.join("; "))
    }
}

impl std::error::Error for ValidationFailure {}

impl ValidationFailure {
    fn new(mut errors: Vec<FieldError>) -> Self {
        errors.sort_by(|a, b| a.path.cmp(&b.path));
        errors.dedup();
        Self { errors }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Messages attached to one form path
    pub fn for_path(&self, path: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.path == path)
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn has_path(&self, path: &str) -> bool {
        self.errors.iter().any(|e| e.path == path)
    }

    /// One-line message for the submitter: the token problem if there is
    /// one, otherwise a generic hint to re-check the form
    pub fn summary(&self) -> String {
        let token_errors = self.for_path(TOKEN_PATH);
        if token_errors.is_empty() {
            MSG_VALIDATION_FAILED.to_string()
        } else {
            token_errors.join(" ")
        }
    }
}

impl From<ValidationFailure> for AppError {
    fn from(failure: ValidationFailure) -> Self {
        let code = if failure.has_path(TOKEN_PATH) {
            ErrorCode::VerificationTokenMissing
        } else {
            ErrorCode::ValidationFailed
        };
        let errors = serde_json::to_value(failure.errors()).unwrap_or_default();
        AppError::with_message(code, failure.summary()).with_detail("errors", errors)
    }
}

/// Converts a validator field name (`phone_number`) into the form's
/// camelCase path segment (`phoneNumber`)
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for ch in field.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

fn collect_errors(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let segment = camel_case(&field.to_string());
        let path = if prefix.is_empty() {
            segment
        } else {
            format!("{prefix}.{segment}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    out.push(FieldError::new(path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_errors(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_errors(inner, &format!("{path}.{index}"), out);
                }
            }
        }
    }
}

// ── Validation layers ───────────────────────────────────────────────

/// Form contents after the inner layer accepted them
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedForm {
    pub guests: Vec<GuestEntry>,
    pub message: Option<String>,
    pub honeypot: Option<String>,
}

/// Cross-field refinement over guests that already passed per-field checks.
/// Also resolves the enum-valued fields, returning `None` for any guest it
/// could not normalize.
fn refine_guests(guests: &[RawGuest], out: &mut Vec<FieldError>) -> Vec<Option<GuestEntry>> {
    if guests.is_empty() {
        out.push(FieldError::new("guests", MSG_GUESTS_EMPTY));
    }

    guests
        .iter()
        .enumerate()
        .map(|(index, guest)| {
            let attendance = match guest.attendance.as_deref() {
                // Absence is already reported by the `required` rule
                None => None,
                Some(value) => {
                    let parsed = Attendance::parse(value);
                    if parsed.is_none() {
                        out.push(FieldError::new(
                            format!("guests.{index}.attendance"),
                            MSG_ATTENDANCE_REQUIRED,
                        ));
                    }
                    parsed
                }
            };

            let housing_path = format!("guests.{index}.housingRequired");
            let housing = match guest.housing_required.as_deref() {
                None | Some("") => None,
                Some(value) => {
                    let parsed = HousingChoice::parse(value);
                    if parsed.is_none() {
                        out.push(FieldError::new(housing_path.clone(), MSG_HOUSING_REQUIRED));
                    }
                    parsed
                }
            };

            let attendance = attendance?;
            if attendance.is_attending() && housing.is_none() {
                out.push(FieldError::new(housing_path, MSG_HOUSING_REQUIRED));
                return None;
            }

            Some(GuestEntry {
                name: guest.name.clone(),
                phone_number: guest.phone_number.clone(),
                attendance,
                alcohol_preference: guest.alcohol_preference.clone().unwrap_or_default(),
                housing_required: housing,
            })
        })
        .collect()
}

fn check_form(form: &RsvpForm, out: &mut Vec<FieldError>) -> Option<ValidatedForm> {
    if let Err(errors) = form.validate() {
        collect_errors(&errors, "", out);
    }

    let guests = refine_guests(&form.guests, out);
    if !out.is_empty() {
        return None;
    }

    Some(ValidatedForm {
        guests: guests.into_iter().flatten().collect(),
        message: form.message.clone(),
        honeypot: form.secret_notes.clone(),
    })
}

/// Inner layer: guest rules and message length, no token check
pub fn validate_form(form: &RsvpForm) -> Result<ValidatedForm, ValidationFailure> {
    let mut errors = Vec::new();
    check_form(form, &mut errors).ok_or_else(|| ValidationFailure::new(errors))
}

/// Outer layer: everything [`validate_form`] checks plus a non-empty
/// verification token
pub fn validate_submission(
    submission: &RsvpSubmission,
) -> Result<SubmissionRequest, ValidationFailure> {
    let mut errors = Vec::new();
    let form = check_form(&submission.form, &mut errors);

    // Only the token carries rules at this level; the form was checked above
    if let Err(token_errors) = submission.validate() {
        collect_errors(&token_errors, "", &mut errors);
    }

    match (form, submission.recaptcha_token.as_deref()) {
        (Some(form), Some(token)) if errors.is_empty() => Ok(SubmissionRequest {
            guests: form.guests,
            message: form.message,
            honeypot: form.honeypot,
            verification_token: token.to_string(),
        }),
        _ => Err(ValidationFailure::new(errors)),
    }
}
