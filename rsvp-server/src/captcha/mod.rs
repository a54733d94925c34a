//! Bot verification
//!
//! [`BotVerifier`] is the seam the submission pipeline depends on;
//! [`RecaptchaVerifier`] is the production implementation. Verification
//! never errors: every failure mode becomes a rejected [`Verification`].

mod recaptcha;

pub use recaptcha::{RecaptchaVerifier, SiteVerifyResponse, evaluate};

use async_trait::async_trait;
use shared::error::ErrorCode;

/// Redeems a verification token issued by the page widget
#[async_trait]
pub trait BotVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Verification;
}

/// Why a token was not accepted
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// Shared secret is not configured
    NotConfigured,
    /// Verification endpoint answered with a non-2xx status
    Upstream { status: u16 },
    /// Service reported failure, with its own error codes
    Failed { error_codes: Vec<String> },
    /// Score below the accepted threshold
    LowScore { score: f64, threshold: f64 },
    /// Token was issued for a different form action
    ActionMismatch { expected: String, actual: Option<String> },
    /// Network or parsing failure
    Internal(String),
}

impl Rejection {
    /// Message shown to the submitter
    pub fn user_message(&self) -> String {
        match self {
            Self::NotConfigured => "Ошибка конфигурации сервера для reCAPTCHA.".to_string(),
            Self::Upstream { status } => {
                format!("Ошибка связи с сервисом reCAPTCHA: {status}")
            }
            Self::Failed { .. } => "Проверка reCAPTCHA не удалась.".to_string(),
            Self::LowScore { .. } => "Проверка reCAPTCHA не пройдена (низкий балл).".to_string(),
            Self::ActionMismatch { .. } => {
                "Проверка reCAPTCHA не пройдена (неверное действие).".to_string()
            }
            Self::Internal(_) => "Внутренняя ошибка сервера при проверке reCAPTCHA.".to_string(),
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotConfigured => ErrorCode::ConfigError,
            Self::Upstream { .. } | Self::Internal(_) => ErrorCode::VerificationUnavailable,
            Self::Failed { .. } => ErrorCode::VerificationRejected,
            Self::LowScore { .. } => ErrorCode::VerificationLowScore,
            Self::ActionMismatch { .. } => ErrorCode::VerificationActionMismatch,
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "verification secret is not configured"),
            Self::Upstream { status } => write!(f, "verification endpoint returned {status}"),
            Self::Failed { error_codes } => {
                write!(f, "verification failed: [{}]", error_codes.join(", "))
            }
            Self::LowScore { score, threshold } => {
                write!(f, "score {score} below threshold {threshold}")
            }
            Self::ActionMismatch { expected, actual } => write!(
                f,
                "action mismatch: expected {expected}, got {}",
                actual.as_deref().unwrap_or("<none>")
            ),
            Self::Internal(msg) => write!(f, "verification error: {msg}"),
        }
    }
}

/// Outcome of one verification call
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub accepted: bool,
    /// Confidence score reported by the service, when it gave one
    pub score: Option<f64>,
    pub rejection: Option<Rejection>,
}

impl Verification {
    pub fn accepted(score: Option<f64>) -> Self {
        Self {
            accepted: true,
            score,
            rejection: None,
        }
    }

    pub fn rejected(rejection: Rejection) -> Self {
        let score = match &rejection {
            Rejection::LowScore { score, .. } => Some(*score),
            _ => None,
        };
        Self {
            accepted: false,
            score,
            rejection: Some(rejection),
        }
    }
}
