//! Data models
//!
//! Shared between rsvp-server and the invitation page (via API).

pub mod rsvp;

// Re-exports
pub use rsvp::*;
