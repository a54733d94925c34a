//! Wedding RSVP server
//!
//! Accepts RSVP form posts, checks them against reCAPTCHA v3 and appends
//! one row per guest to a Google spreadsheet.
//!
//! ```text
//! rsvp-server/src/
//! ├── api/          # axum routes and handlers
//! ├── captcha/      # bot verification (reCAPTCHA)
//! ├── sheets/       # Google Sheets store, service-account auth
//! ├── rsvp/         # row formatting, submission pipeline
//! ├── config.rs     # environment configuration
//! ├── logger.rs     # tracing setup
//! ├── rate_limit.rs # per-IP limiter for submissions
//! ├── error.rs      # ServiceError
//! └── state.rs      # AppState
//! ```

pub mod api;
pub mod captcha;
pub mod config;
pub mod error;
pub mod logger;
pub mod rate_limit;
pub mod rsvp;
pub mod sheets;
pub mod state;

pub use config::Config;
pub use error::{ServiceError, ServiceResult};
pub use rsvp::RsvpService;
pub use state::AppState;
