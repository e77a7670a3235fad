//! Public data types exchanged with the identity provider

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Tokens this close to their expiry are refreshed before use
pub const EXPIRY_MARGIN_SECS: i64 = 30;

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs() as i64
}

/// Tokens issued for a signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    /// The access token sent to the admin API
    pub access_token: String,

    /// The OpenID identity token
    pub id_token: Option<String>,

    /// The refresh token
    pub refresh_token: Option<String>,

    /// The token type
    pub token_type: String,

    /// The lifetime in seconds
    pub expires_in: i64,

    /// The expiry timestamp
    pub expires_at: Option<i64>,
}

impl AuthTokens {
    /// Create tokens that expire `expires_in` seconds from now
    pub fn new(
        access_token: String,
        id_token: Option<String>,
        refresh_token: Option<String>,
        expires_in: i64,
    ) -> Self {
        Self {
            access_token,
            id_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
            // A lifetime of 0 means the provider did not say
            expires_at: (expires_in > 0).then(|| now_secs() + expires_in),
        }
    }

    /// Check if the access token has expired or is about to
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => now_secs() + EXPIRY_MARGIN_SECS >= expires_at,
            None => false,
        }
    }
}

/// Result of a session fetch; `tokens` is `None` when nobody is signed in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    pub tokens: Option<AuthTokens>,
}

impl AuthSession {
    pub fn access_token(&self) -> Option<&str> {
        self.tokens.as_ref().map(|t| t.access_token.as_str())
    }
}

/// The signed-in user as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub username: String,
    pub user_id: String,
    pub email: Option<String>,
}

/// A name/value attribute attached at sign-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAttribute {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl UserAttribute {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    pub fn email(value: &str) -> Self {
        Self::new("email", value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInOutput {
    pub is_signed_in: bool,
    /// Set when the provider asks for another step instead of issuing tokens
    pub challenge: Option<String>,
}

/// What the caller has to do after `sign_up`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpStep {
    /// A verification code was sent; `destination` is the masked address
    ConfirmSignUp { destination: Option<String> },
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutput {
    pub is_sign_up_complete: bool,
    pub user_id: Option<String>,
    pub next_step: SignUpStep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmSignUpOutput {
    pub is_sign_up_complete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_tokens_are_not_expired() {
        let tokens = AuthTokens::new("access".to_string(), None, None, 3600);
        assert!(!tokens.is_expired());
        assert_eq!(tokens.token_type, "Bearer");
    }

    #[test]
    fn past_expiry_is_expired() {
        let mut tokens = AuthTokens::new("access".to_string(), None, None, 3600);
        tokens.expires_at = Some(now_secs() - 1);
        assert!(tokens.is_expired());
    }

    #[test]
    fn tokens_close_to_expiry_count_as_expired() {
        let tokens = AuthTokens::new("access".to_string(), None, None, 1);
        assert!(tokens.is_expired());

        let tokens = AuthTokens::new("access".to_string(), None, None, EXPIRY_MARGIN_SECS + 60);
        assert!(!tokens.is_expired());
    }

    #[test]
    fn unknown_lifetime_never_expires() {
        let tokens = AuthTokens::new("access".to_string(), None, None, 0);
        assert_eq!(tokens.expires_at, None);
        assert!(!tokens.is_expired());
    }

    #[test]
    fn attributes_use_provider_casing() {
        let value = serde_json::to_value(UserAttribute::email("ops@example.com")).unwrap();
        assert_eq!(value, serde_json::json!({"Name": "email", "Value": "ops@example.com"}));
    }
}
