use serde::Deserialize;
use thiserror::Error;

/// Errors raised by the identity provider client
#[derive(Error, Debug)]
pub enum IdentityError {
    /// The provider rejected the request with a named error
    #[error("{name}: {message}")]
    ServiceError {
        status: u16,
        name: String,
        message: String,
    },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("User is not authenticated")]
    UserUnauthenticated,

    #[error("Auto sign-in is not available")]
    AutoSignInUnavailable,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    kind: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

impl IdentityError {
    /// Build a service error from a non-2xx provider response.
    ///
    /// The provider reports `{"__type": "...", "message": "..."}`; the type may
    /// carry a namespace prefix separated by `#`.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorBody>(body).ok();

        let name = parsed
            .as_ref()
            .and_then(|b| b.kind.as_deref())
            .map(|kind| kind.rsplit('#').next().unwrap_or(kind).to_string())
            .unwrap_or_else(|| format!("HttpError{}", status));

        let message = parsed
            .and_then(|b| b.message)
            .unwrap_or_else(|| body.trim().to_string());

        Self::ServiceError {
            status,
            name,
            message,
        }
    }

    /// The provider's error identifier, e.g. `NotAuthorizedException`
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::ServiceError { name, .. } => Some(name),
            Self::UserUnauthenticated => Some("UserUnAuthenticatedException"),
            Self::AutoSignInUnavailable => Some("AutoSignInException"),
            _ => None,
        }
    }

    /// Human readable message without the identifier prefix
    pub fn message(&self) -> String {
        match self {
            Self::ServiceError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
