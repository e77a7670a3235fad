//! Identity provider client for the tenant admin portal
//!
//! This crate signs operators in against a Cognito-style user pool, drives the
//! sign-up and code verification steps, keeps the issued tokens in memory and
//! refreshes them when they expire. State changes are published as
//! [`HubEvent`]s.

mod client;
mod config;
mod error;
mod hub;
mod types;

use async_trait::async_trait;
use tokio::sync::broadcast;

pub use client::CognitoClient;
pub use config::IdentityConfig;
pub use error::IdentityError;
pub use hub::HubEvent;
pub use types::{
    AuthSession, AuthTokens, AuthUser, ConfirmSignUpOutput, SignInOutput, SignUpOutput,
    SignUpStep, UserAttribute, EXPIRY_MARGIN_SECS,
};

/// Operations the admin portal needs from an identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign in with username and password
    async fn sign_in(&self, username: &str, password: &str) -> Result<SignInOutput, IdentityError>;

    /// Register a new user
    async fn sign_up(
        &self,
        username: &str,
        password: &str,
        attributes: &[UserAttribute],
    ) -> Result<SignUpOutput, IdentityError>;

    /// Confirm a registration with the code sent to the user
    async fn confirm_sign_up(
        &self,
        username: &str,
        code: &str,
    ) -> Result<ConfirmSignUpOutput, IdentityError>;

    /// Sign in with the credentials of a just-confirmed sign-up
    async fn auto_sign_in(&self) -> Result<SignInOutput, IdentityError>;

    /// Sign out; local tokens are dropped even if the remote call fails
    async fn sign_out(&self) -> Result<(), IdentityError>;

    async fn get_current_user(&self) -> Result<AuthUser, IdentityError>;

    /// Current tokens, refreshed first when expired
    async fn fetch_session(&self) -> Result<AuthSession, IdentityError>;

    /// Subscribe to hub events
    fn events(&self) -> broadcast::Receiver<HubEvent>;
}
