//! Error handling for the tenant admin client

use std::fmt;
use thiserror::Error;

/// Unified error type for the tenant admin client
#[derive(Error, Debug)]
pub enum Error {
    /// The admin API answered with a non-2xx status
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// Transport failures
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new HTTP status error
    pub fn http<T: fmt::Display>(status: u16, msg: T) -> Self {
        Error::Http {
            status,
            message: msg.to_string(),
        }
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Status code for HTTP errors
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
