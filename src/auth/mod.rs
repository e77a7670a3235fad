//! Authentication: the operator session and the sign-in / sign-up flow

mod error;
mod session;
mod types;

use log::{debug, error, info};
use std::sync::Arc;

use tenant_admin_identity::{IdentityProvider, SignUpStep, UserAttribute};

pub use error::*;
pub use session::*;
pub use types::*;

pub const MIN_PASSWORD_LENGTH: usize = 8;

fn require(value: &str, field: &'static str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::MissingField(field));
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// Drives the auth page: login form, sign-up form and code verification
///
/// A fresh flow starts on the login form. Errors from the last submission
/// are kept in [`AuthFlow::error`] until the next submission or
/// [`AuthFlow::dismiss_error`].
pub struct AuthFlow {
    provider: Arc<dyn IdentityProvider>,
    session: SessionStore,
    view: AuthView,
    error: Option<AuthError>,
    notice: Option<String>,
}

impl AuthFlow {
    pub fn new(provider: Arc<dyn IdentityProvider>, session: SessionStore) -> Self {
        Self {
            provider,
            session,
            view: AuthView::Login,
            error: None,
            notice: None,
        }
    }

    pub fn view(&self) -> &AuthView {
        &self.view
    }

    pub fn error(&self) -> Option<&AuthError> {
        self.error.as_ref()
    }

    /// Last success message (code sent, account created, email verified)
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Email waiting for its verification code
    pub fn pending_email(&self) -> Option<&str> {
        match &self.view {
            AuthView::Signup(SignupStep::AwaitingVerificationCode { email }) => Some(email),
            _ => None,
        }
    }

    pub fn show_signup(&mut self) {
        self.view = AuthView::Signup(SignupStep::AwaitingCredentials);
        self.error = None;
    }

    pub fn show_login(&mut self) {
        self.view = AuthView::Login;
        self.error = None;
    }

    /// Go straight to the code form for an account signed up earlier
    pub fn resume_verification(&mut self, email: &str) {
        self.view = AuthView::Signup(SignupStep::AwaitingVerificationCode {
            email: email.trim().to_string(),
        });
        self.error = None;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    fn fail<T>(&mut self, err: AuthError) -> Result<T, AuthError> {
        self.error = Some(err.clone());
        Err(err)
    }

    /// Submit the login form. Navigation follows from the session store.
    pub async fn submit_login(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        self.error = None;

        let checked = require(email, "email")
            .and_then(|_| {
                if is_valid_email(email) {
                    Ok(())
                } else {
                    Err(AuthError::InvalidEmail)
                }
            })
            .and_then(|_| require(password, "password"));
        if let Err(e) = checked {
            return self.fail(e);
        }

        match self.session.sign_in(email, password).await {
            Ok(()) => Ok(()),
            Err(e) => self.fail(e),
        }
    }

    /// Submit the sign-up form.
    ///
    /// Passwords are compared locally; a mismatch never reaches the provider.
    pub async fn submit_signup(
        &mut self,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> Result<SignupOutcome, AuthError> {
        self.error = None;

        let checked = require(email, "email")
            .and_then(|_| {
                if is_valid_email(email) {
                    Ok(())
                } else {
                    Err(AuthError::InvalidEmail)
                }
            })
            .and_then(|_| require(password, "password"))
            .and_then(|_| require(confirm, "password confirmation"))
            .and_then(|_| {
                if password == confirm {
                    Ok(())
                } else {
                    Err(AuthError::PasswordMismatch)
                }
            })
            .and_then(|_| {
                if password.chars().count() >= MIN_PASSWORD_LENGTH {
                    Ok(())
                } else {
                    Err(AuthError::PasswordTooShort)
                }
            });
        if let Err(e) = checked {
            return self.fail(e);
        }

        let output = match self
            .provider
            .sign_up(email, password, &[UserAttribute::email(email)])
            .await
        {
            Ok(output) => output,
            Err(e) => {
                error!("Error signing up: {}", e);
                return self.fail(AuthError::from_provider(AuthStep::SignUp, &e));
            }
        };

        match output.next_step {
            SignUpStep::ConfirmSignUp { destination } => {
                debug!("Verification code sent to {:?}", destination);
                self.view = AuthView::Signup(SignupStep::AwaitingVerificationCode {
                    email: email.to_string(),
                });
                self.notice = Some("Verification code sent to your email!".to_string());
                Ok(SignupOutcome::VerificationRequired {
                    email: email.to_string(),
                })
            }
            SignUpStep::Done => {
                self.notice = Some("Account created successfully!".to_string());
                self.view = AuthView::Login;
                Ok(SignupOutcome::Completed)
            }
        }
    }

    /// Submit the verification code for the pending sign-up.
    ///
    /// After the provider accepts the code an automatic sign-in is tried. If
    /// that fails the login form is shown; the verification still counts.
    pub async fn submit_verification_code(
        &mut self,
        code: &str,
    ) -> Result<VerificationOutcome, AuthError> {
        self.error = None;

        let email = match self.pending_email().map(str::to_string) {
            Some(email) => email,
            None => return self.fail(AuthError::NoPendingVerification),
        };
        if let Err(e) = require(code, "verification code") {
            return self.fail(e);
        }

        let confirmed = match self.provider.confirm_sign_up(&email, code.trim()).await {
            Ok(output) => output,
            Err(e) => {
                error!("Error confirming sign up: {}", e);
                return self.fail(AuthError::from_provider(AuthStep::Verification, &e));
            }
        };

        if !confirmed.is_sign_up_complete {
            return Ok(VerificationOutcome::Pending);
        }
        self.notice = Some("Email verified successfully!".to_string());

        match self.provider.auto_sign_in().await {
            Ok(output) if output.is_signed_in => {
                info!("Signed in automatically after verifying {}", email);
                Ok(VerificationOutcome::SignedIn)
            }
            Ok(_) | Err(_) => {
                info!("Auto sign-in failed, redirecting to login");
                self.view = AuthView::Login;
                Ok(VerificationOutcome::LoginRequired)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("ops@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.co"));
        assert!(!is_valid_email("ops.example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ops@example"));
        assert!(!is_valid_email("ops@@example.com"));
        assert!(!is_valid_email("ops @example.com"));
    }

    #[test]
    fn required_fields_reject_blank_input() {
        assert_eq!(require("  ", "email"), Err(AuthError::MissingField("email")));
        assert_eq!(require("x", "email"), Ok(()));
    }
}
