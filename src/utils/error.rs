use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Render timed out after {}s waiting for '{selector}'", timeout.as_secs())]
    RenderTimeout { timeout: Duration, selector: String },

    #[error("Render failed: {0}")]
    RenderFailure(String),

    #[error("Parsing error: {message}")]
    ParseFailure { message: String },

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
