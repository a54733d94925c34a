//! RSVP Model

use serde::{Deserialize, Serialize};

/// Whether a guest is coming. Wire values are `"yes"` / `"no"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attendance {
    #[serde(rename = "yes")]
    Attending,
    #[serde(rename = "no")]
    NotAttending,
}

impl Attendance {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "yes" => Some(Self::Attending),
            "no" => Some(Self::NotAttending),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attending => "yes",
            Self::NotAttending => "no",
        }
    }

    pub fn is_attending(&self) -> bool {
        matches!(self, Self::Attending)
    }
}

/// Answer to "do you need housing". Wire values are `"yes"` / `"no"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HousingChoice {
    Yes,
    No,
}

impl HousingChoice {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            _ => None,
        }
    }
}

/// One validated guest of a submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestEntry {
    pub name: String,
    pub phone_number: String,
    pub attendance: Attendance,
    /// Preference ids as sent by the form (e.g. `champagne`)
    #[serde(default)]
    pub alcohol_preference: Vec<String>,
    /// Always `Some` when `attendance` is `Attending`
    pub housing_required: Option<HousingChoice>,
}

/// A validated RSVP submission, built once per form post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub guests: Vec<GuestEntry>,
    pub message: Option<String>,
    /// Hidden decoy field; any non-empty value marks the post as automated
    pub honeypot: Option<String>,
    pub verification_token: String,
}

impl SubmissionRequest {
    /// Whether the decoy field was filled in
    pub fn is_honeypot_filled(&self) -> bool {
        self.honeypot.as_deref().is_some_and(|v| !v.is_empty())
    }
}

/// Result returned to the submitter: `{ "success": bool, "error"?: string }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmissionResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}
