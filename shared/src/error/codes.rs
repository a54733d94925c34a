//! Unified error codes for the RSVP service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Bot verification errors
//! - 2xxx: Guest store errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 values on the wire so the page script can switch on
/// them without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Too many requests from one client
    TooManyRequests = 9,

    // ==================== 1xxx: Verification ====================
    /// Verification token missing from the submission
    VerificationTokenMissing = 1001,
    /// Verification service rejected the token
    VerificationRejected = 1002,
    /// Verification score below the accepted threshold
    VerificationLowScore = 1003,
    /// Verification action label does not match the form
    VerificationActionMismatch = 1004,
    /// Verification service unreachable or misconfigured
    VerificationUnavailable = 1005,

    // ==================== 2xxx: Store ====================
    /// Spreadsheet credentials are not configured
    StoreNotConfigured = 2001,
    /// Appending rows to the spreadsheet failed
    StoreWriteFailed = 2002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::TooManyRequests => "Too many requests, try again later",

            // Verification
            ErrorCode::VerificationTokenMissing => "Verification token is required",
            ErrorCode::VerificationRejected => "Verification failed",
            ErrorCode::VerificationLowScore => "Verification score too low",
            ErrorCode::VerificationActionMismatch => "Verification action mismatch",
            ErrorCode::VerificationUnavailable => "Verification service unavailable",

            // Store
            ErrorCode::StoreNotConfigured => "Guest store is not configured",
            ErrorCode::StoreWriteFailed => "Failed to save RSVP",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),
            9 => Ok(ErrorCode::TooManyRequests),

            // Verification
            1001 => Ok(ErrorCode::VerificationTokenMissing),
            1002 => Ok(ErrorCode::VerificationRejected),
            1003 => Ok(ErrorCode::VerificationLowScore),
            1004 => Ok(ErrorCode::VerificationActionMismatch),
            1005 => Ok(ErrorCode::VerificationUnavailable),

            // Store
            2001 => Ok(ErrorCode::StoreNotConfigured),
            2002 => Ok(ErrorCode::StoreWriteFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
