//! Shared types for the wedding RSVP service
//!
//! Wire types, validation rules and error codes used by the server and
//! mirrored by the invitation page.

pub mod error;
pub mod models;
pub mod validation;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use models::{Attendance, GuestEntry, HousingChoice, SubmissionRequest, SubmissionResult};
pub use validation::{FieldError, RsvpForm, RsvpSubmission, ValidationFailure};
