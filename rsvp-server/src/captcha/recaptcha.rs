//! reCAPTCHA v3 `siteverify` client

use async_trait::async_trait;
use serde::Deserialize;

use super::{BotVerifier, Rejection, Verification};
use crate::config::RecaptchaConfig;

/// JSON body returned by the `siteverify` endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteVerifyResponse {
    pub success: bool,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default, rename = "error-codes")]
    pub error_codes: Vec<String>,
    #[serde(default)]
    pub hostname: Option<String>,
}

/// Apply the acceptance policy to a well-formed response.
///
/// A missing score is treated as 0.0 so that keys without scoring never pass
/// a non-zero threshold.
pub fn evaluate(
    response: &SiteVerifyResponse,
    threshold: f64,
    expected_action: &str,
) -> Verification {
    if !response.success {
        return Verification::rejected(Rejection::Failed {
            error_codes: response.error_codes.clone(),
        });
    }

    let score = response.score.unwrap_or(0.0);
    if score < threshold {
        return Verification::rejected(Rejection::LowScore { score, threshold });
    }

    if response.action.as_deref() != Some(expected_action) {
        return Verification::rejected(Rejection::ActionMismatch {
            expected: expected_action.to_string(),
            actual: response.action.clone(),
        });
    }

    Verification::accepted(Some(score))
}

/// Verifies tokens against Google's reCAPTCHA service
#[derive(Clone)]
pub struct RecaptchaVerifier {
    client: reqwest::Client,
    secret: Option<String>,
    verify_url: String,
    threshold: f64,
    expected_action: String,
}

impl RecaptchaVerifier {
    pub fn new(config: &RecaptchaConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            secret: config.secret_key.clone(),
            verify_url: config.verify_url.clone(),
            threshold: config.score_threshold,
            expected_action: config.expected_action.clone(),
        }
    }

    async fn siteverify(&self, secret: &str, token: &str) -> Result<Verification, reqwest::Error> {
        let response = self
            .client
            .post(&self.verify_url)
            .form(&[("secret", secret), ("response", token)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), %body, "reCAPTCHA endpoint returned an error");
            return Ok(Verification::rejected(Rejection::Upstream {
                status: status.as_u16(),
            }));
        }

        let data: SiteVerifyResponse = response.json().await?;
        tracing::info!(
            success = data.success,
            score = ?data.score,
            action = ?data.action,
            hostname = ?data.hostname,
            "reCAPTCHA response received"
        );

        Ok(evaluate(&data, self.threshold, &self.expected_action))
    }
}

#[async_trait]
impl BotVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> Verification {
        let Some(secret) = self.secret.as_deref() else {
            tracing::error!("RECAPTCHA_SECRET_KEY is not set, rejecting submission");
            return Verification::rejected(Rejection::NotConfigured);
        };

        let verification = match self.siteverify(secret, token).await {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "reCAPTCHA verification request failed");
                Verification::rejected(Rejection::Internal(e.to_string()))
            }
        };

        if let Some(rejection) = &verification.rejection {
            tracing::warn!(%rejection, "reCAPTCHA rejected submission");
        }
        verification
    }
}
