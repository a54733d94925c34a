//! RSVP domain: row formatting and the submission pipeline

pub mod format;
mod service;

pub use service::{MSG_SAVE_FAILED, MSG_UNEXPECTED, RsvpService};
