//! Startup error type
//!
//! Request handling reports failures as [`shared::error::AppError`]; this
//! type only covers what can stop the process from coming up: building the
//! outbound HTTP client, binding the listener, serving.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        fn bind() -> ServiceResult<()> {
            Err(std::io::Error::new(
                std::io::ErrorKind::AddrInUse,
                "address already in use",
            ))?
        }

        let err = bind().unwrap_err();
        assert!(matches!(err, ServiceError::Io(_)));
        assert_eq!(err.to_string(), "I/O error: address already in use");
    }
}
