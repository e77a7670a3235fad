use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};

use crate::config::IdentityConfig;
use crate::error::IdentityError;
use crate::hub::HubEvent;
use crate::types::*;
use crate::IdentityProvider;

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: String,
    /// 0 when absent, which leaves the expiry unknown
    #[serde(default)]
    expires_in: i64,
    id_token: Option<String>,
    refresh_token: Option<String>,
    token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CodeDeliveryDetails {
    destination: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SignUpResponse {
    #[serde(default)]
    user_confirmed: bool,
    user_sub: Option<String>,
    code_delivery_details: Option<CodeDeliveryDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetUserResponse {
    username: String,
    #[serde(default)]
    user_attributes: Vec<UserAttribute>,
}

/// Credentials kept between sign-up and the automatic sign-in
#[derive(Debug, Clone)]
struct PendingSignIn {
    username: String,
    password: String,
    confirmed: bool,
}

/// Client for a Cognito-style user pool
///
/// Tokens live in memory only. Every state change is announced on the hub
/// channel returned by [`IdentityProvider::events`].
pub struct CognitoClient {
    config: IdentityConfig,
    http_client: Client,
    tokens: Arc<RwLock<Option<AuthTokens>>>,
    pending_sign_in: Arc<Mutex<Option<PendingSignIn>>>,
    refresh_lock: Mutex<()>,
    events: broadcast::Sender<HubEvent>,
}

impl CognitoClient {
    pub fn new(config: IdentityConfig, http_client: Client) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            config,
            http_client,
            tokens: Arc::new(RwLock::new(None)),
            pending_sign_in: Arc::new(Mutex::new(None)),
            refresh_lock: Mutex::new(()),
            events,
        }
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    /// Replace the stored tokens without talking to the provider
    pub async fn set_tokens(&self, tokens: Option<AuthTokens>) {
        *self.tokens.write().await = tokens;
    }

    fn emit(&self, event: HubEvent) {
        debug!("Hub event: {}", event);
        // No receivers is fine
        let _ = self.events.send(event);
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        payload: &serde_json::Value,
    ) -> Result<T, IdentityError> {
        let endpoint = self.config.endpoint()?;
        let url = format!("{}/", endpoint);
        debug!("Identity request {} -> {}", operation, url);

        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", CONTENT_TYPE)
            .header("X-Amz-Target", format!("{}.{}", TARGET_PREFIX, operation))
            .body(serde_json::to_vec(payload)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(IdentityError::from_response(status.as_u16(), &error_text));
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_slice(b"{}")?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn store_result(&self, result: AuthenticationResult, previous_refresh: Option<String>) {
        let mut tokens = AuthTokens::new(
            result.access_token,
            result.id_token,
            result.refresh_token.or(previous_refresh),
            result.expires_in,
        );
        if let Some(token_type) = result.token_type {
            tokens.token_type = token_type;
        }
        *self.tokens.write().await = Some(tokens);
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthTokens, IdentityError> {
        let payload = json!({
            "AuthFlow": "REFRESH_TOKEN_AUTH",
            "ClientId": self.config.client_id,
            "AuthParameters": { "REFRESH_TOKEN": refresh_token },
        });

        let response: InitiateAuthResponse = self.call("InitiateAuth", &payload).await?;
        let result = response.authentication_result.ok_or_else(|| {
            IdentityError::ServiceError {
                status: 200,
                name: "NotAuthorizedException".to_string(),
                message: "Refresh did not return tokens".to_string(),
            }
        })?;

        self.store_result(result, Some(refresh_token.to_string()))
            .await;
        self.tokens
            .read()
            .await
            .clone()
            .ok_or(IdentityError::UserUnauthenticated)
    }

    async fn clear(&self) {
        *self.tokens.write().await = None;
    }
}

#[async_trait]
impl IdentityProvider for CognitoClient {
    async fn sign_in(&self, username: &str, password: &str) -> Result<SignInOutput, IdentityError> {
        let payload = json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": self.config.client_id,
            "AuthParameters": { "USERNAME": username, "PASSWORD": password },
        });

        let response: InitiateAuthResponse = self.call("InitiateAuth", &payload).await?;

        match response.authentication_result {
            Some(result) => {
                self.store_result(result, None).await;
                info!("Signed in as {}", username);
                self.emit(HubEvent::SignedIn);
                Ok(SignInOutput {
                    is_signed_in: true,
                    challenge: None,
                })
            }
            None => Ok(SignInOutput {
                is_signed_in: false,
                challenge: response.challenge_name,
            }),
        }
    }

    async fn sign_up(
        &self,
        username: &str,
        password: &str,
        attributes: &[UserAttribute],
    ) -> Result<SignUpOutput, IdentityError> {
        let payload = json!({
            "ClientId": self.config.client_id,
            "Username": username,
            "Password": password,
            "UserAttributes": attributes,
        });

        let response: SignUpResponse = self.call("SignUp", &payload).await?;

        if self.config.auto_sign_in {
            *self.pending_sign_in.lock().await = Some(PendingSignIn {
                username: username.to_string(),
                password: password.to_string(),
                confirmed: response.user_confirmed,
            });
        }

        let next_step = if response.user_confirmed {
            SignUpStep::Done
        } else {
            SignUpStep::ConfirmSignUp {
                destination: response.code_delivery_details.and_then(|d| d.destination),
            }
        };

        Ok(SignUpOutput {
            is_sign_up_complete: response.user_confirmed,
            user_id: response.user_sub,
            next_step,
        })
    }

    async fn confirm_sign_up(
        &self,
        username: &str,
        code: &str,
    ) -> Result<ConfirmSignUpOutput, IdentityError> {
        let payload = json!({
            "ClientId": self.config.client_id,
            "Username": username,
            "ConfirmationCode": code,
        });

        let _: serde_json::Value = self.call("ConfirmSignUp", &payload).await?;

        if let Some(pending) = self.pending_sign_in.lock().await.as_mut() {
            if pending.username == username {
                pending.confirmed = true;
            }
        }

        Ok(ConfirmSignUpOutput {
            is_sign_up_complete: true,
        })
    }

    async fn auto_sign_in(&self) -> Result<SignInOutput, IdentityError> {
        let pending = {
            let mut guard = self.pending_sign_in.lock().await;
            match guard.as_ref() {
                Some(p) if p.confirmed => guard.take(),
                _ => None,
            }
        };

        let pending = pending.ok_or(IdentityError::AutoSignInUnavailable)?;
        self.sign_in(&pending.username, &pending.password).await
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        let tokens = self.tokens.write().await.take();
        self.pending_sign_in.lock().await.take();

        let remote = match tokens {
            Some(tokens) => {
                let payload = json!({ "AccessToken": tokens.access_token });
                self.call::<serde_json::Value>("GlobalSignOut", &payload)
                    .await
                    .map(|_| ())
            }
            None => Ok(()),
        };

        if let Err(ref e) = remote {
            warn!("Remote sign-out failed, local session cleared anyway: {}", e);
        }
        self.emit(HubEvent::SignedOut);
        remote
    }

    async fn get_current_user(&self) -> Result<AuthUser, IdentityError> {
        let session = self.fetch_session().await?;
        let access_token = session
            .access_token()
            .ok_or(IdentityError::UserUnauthenticated)?
            .to_string();

        let payload = json!({ "AccessToken": access_token });
        let response: GetUserResponse = self.call("GetUser", &payload).await?;

        let attribute = |name: &str| {
            response
                .user_attributes
                .iter()
                .find(|a| a.name == name)
                .map(|a| a.value.clone())
        };

        Ok(AuthUser {
            user_id: attribute("sub").unwrap_or_else(|| response.username.clone()),
            email: attribute("email"),
            username: response.username.clone(),
        })
    }

    async fn fetch_session(&self) -> Result<AuthSession, IdentityError> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.tokens.read().await.clone();
        let tokens = match current {
            Some(tokens) => tokens,
            None => return Ok(AuthSession::default()),
        };

        if !tokens.is_expired() {
            return Ok(AuthSession {
                tokens: Some(tokens),
            });
        }

        debug!("Access token expired, refreshing");
        let refreshed = match tokens.refresh_token.as_deref() {
            Some(refresh_token) => self.refresh(refresh_token).await,
            None => Err(IdentityError::UserUnauthenticated),
        };

        match refreshed {
            Ok(tokens) => {
                self.emit(HubEvent::TokenRefresh);
                Ok(AuthSession {
                    tokens: Some(tokens),
                })
            }
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                self.clear().await;
                self.emit(HubEvent::TokenRefreshFailure);
                Err(e)
            }
        }
    }

    fn events(&self) -> broadcast::Receiver<HubEvent> {
        self.events.subscribe()
    }
}
