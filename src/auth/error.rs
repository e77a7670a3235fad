//! User-facing authentication errors

use tenant_admin_identity::IdentityError;
use thiserror::Error;

/// Which part of the auth flow produced an error.
///
/// Provider error names are only translated for the step that can raise
/// them; anything else falls through to the provider's own message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStep {
    SignIn,
    SignUp,
    Verification,
}

impl AuthStep {
    fn fallback_message(&self) -> &'static str {
        match self {
            AuthStep::SignIn => "An error occurred during sign in",
            AuthStep::SignUp => "An error occurred during sign up",
            AuthStep::Verification => "An error occurred during verification",
        }
    }
}

/// Errors shown inline on the sign-in and sign-up forms
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Please verify your email before signing in")]
    UnverifiedAccount,

    #[error("An account with this email already exists")]
    AccountAlreadyExists,

    #[error("Password does not meet requirements")]
    WeakPassword,

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("Verification code has expired")]
    ExpiredCode,

    #[error("Passwords do not match!")]
    PasswordMismatch,

    #[error("{}", missing_field_message(.0))]
    MissingField(&'static str),

    #[error("Please enter a valid email!")]
    InvalidEmail,

    #[error("Password must be at least 8 characters!")]
    PasswordTooShort,

    #[error("There is no sign-up waiting for verification")]
    NoPendingVerification,

    #[error("{0}")]
    Unknown(String),
}

fn missing_field_message(field: &str) -> String {
    match field {
        "password confirmation" => "Please confirm your password!".to_string(),
        "verification code" => "Please input the verification code!".to_string(),
        _ => format!("Please input your {}!", field),
    }
}

impl AuthError {
    /// Translate a provider error raised during `step`
    pub fn from_provider(step: AuthStep, err: &IdentityError) -> Self {
        match (step, err.name()) {
            (AuthStep::SignIn, Some("UserNotFoundException" | "NotAuthorizedException")) => {
                AuthError::InvalidCredentials
            }
            (AuthStep::SignIn, Some("UserNotConfirmedException")) => AuthError::UnverifiedAccount,
            (AuthStep::SignUp, Some("UsernameExistsException")) => AuthError::AccountAlreadyExists,
            (AuthStep::SignUp, Some("InvalidPasswordException")) => AuthError::WeakPassword,
            (AuthStep::Verification, Some("CodeMismatchException")) => AuthError::InvalidCode,
            (AuthStep::Verification, Some("ExpiredCodeException")) => AuthError::ExpiredCode,
            _ => {
                let message = err.message();
                if message.trim().is_empty() {
                    AuthError::Unknown(step.fallback_message().to_string())
                } else {
                    AuthError::Unknown(message)
                }
            }
        }
    }
}
