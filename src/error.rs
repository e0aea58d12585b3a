//! Error types for quotagate.
//!
//! A quota denial is not an error: it is an ordinary [`Decision`] value
//! returned by the limiter. The variants here cover the crate's real failure
//! modes, which are all configuration-shaped.
//!
//! [`Decision`]: crate::admission::Decision

use thiserror::Error;

/// Main error type for quotagate operations.
#[derive(Error, Debug)]
pub enum QuotagateError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for quotagate operations.
pub type Result<T> = std::result::Result<T, QuotagateError>;
