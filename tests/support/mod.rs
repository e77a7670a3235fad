#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::broadcast;

use tenant_admin::identity::{
    AuthSession, AuthTokens, AuthUser, ConfirmSignUpOutput, HubEvent, IdentityError,
    IdentityProvider, SignInOutput, SignUpOutput, SignUpStep, UserAttribute,
};

pub const EMAIL: &str = "ops@example.com";
pub const PASSWORD: &str = "Secret123!";

pub fn service_error(name: &str) -> IdentityError {
    IdentityError::ServiceError {
        status: 400,
        name: name.to_string(),
        message: format!("{} raised by the fake provider", name),
    }
}

/// In-memory identity provider with scriptable failures
pub struct FakeProvider {
    events: broadcast::Sender<HubEvent>,
    calls: Mutex<Vec<&'static str>>,
    user: Mutex<Option<AuthUser>>,
    token: Mutex<Option<String>>,
    sign_in_error: Mutex<Option<String>>,
    sign_up_error: Mutex<Option<String>>,
    sign_up_step: Mutex<SignUpStep>,
    confirm_error: Mutex<Option<String>>,
    auto_sign_in_fails: AtomicBool,
    sign_out_fails: AtomicBool,
    refresh_fails: AtomicBool,
}

impl FakeProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            events,
            calls: Mutex::new(Vec::new()),
            user: Mutex::new(None),
            token: Mutex::new(None),
            sign_in_error: Mutex::new(None),
            sign_up_error: Mutex::new(None),
            sign_up_step: Mutex::new(SignUpStep::ConfirmSignUp {
                destination: Some("o***@e***.com".to_string()),
            }),
            confirm_error: Mutex::new(None),
            auto_sign_in_fails: AtomicBool::new(false),
            sign_out_fails: AtomicBool::new(false),
            refresh_fails: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn emit(&self, event: HubEvent) {
        let _ = self.events.send(event);
    }

    /// Put a signed-in user in place without emitting anything
    pub fn set_user(&self, email: &str) {
        *self.user.lock().unwrap() = Some(AuthUser {
            username: email.to_string(),
            user_id: "sub-001".to_string(),
            email: Some(email.to_string()),
        });
        *self.token.lock().unwrap() = Some("token-1".to_string());
    }

    pub fn fail_sign_in(&self, name: &str) {
        *self.sign_in_error.lock().unwrap() = Some(name.to_string());
    }

    pub fn fail_sign_up(&self, name: &str) {
        *self.sign_up_error.lock().unwrap() = Some(name.to_string());
    }

    pub fn complete_sign_up_immediately(&self) {
        *self.sign_up_step.lock().unwrap() = SignUpStep::Done;
    }

    pub fn fail_confirm(&self, name: &str) {
        *self.confirm_error.lock().unwrap() = Some(name.to_string());
    }

    pub fn fail_auto_sign_in(&self) {
        self.auto_sign_in_fails.store(true, Ordering::SeqCst);
    }

    pub fn fail_sign_out(&self) {
        self.sign_out_fails.store(true, Ordering::SeqCst);
    }

    pub fn fail_refresh(&self) {
        self.refresh_fails.store(true, Ordering::SeqCst);
    }

    fn signed_in(&self, email: &str) -> SignInOutput {
        self.set_user(email);
        self.emit(HubEvent::SignedIn);
        SignInOutput {
            is_signed_in: true,
            challenge: None,
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn sign_in(&self, username: &str, _password: &str) -> Result<SignInOutput, IdentityError> {
        self.record("sign_in");
        if let Some(name) = self.sign_in_error.lock().unwrap().clone() {
            return Err(service_error(&name));
        }
        Ok(self.signed_in(username))
    }

    async fn sign_up(
        &self,
        _username: &str,
        _password: &str,
        _attributes: &[UserAttribute],
    ) -> Result<SignUpOutput, IdentityError> {
        self.record("sign_up");
        if let Some(name) = self.sign_up_error.lock().unwrap().clone() {
            return Err(service_error(&name));
        }
        let next_step = self.sign_up_step.lock().unwrap().clone();
        Ok(SignUpOutput {
            is_sign_up_complete: next_step == SignUpStep::Done,
            user_id: Some("sub-001".to_string()),
            next_step,
        })
    }

    async fn confirm_sign_up(
        &self,
        _username: &str,
        _code: &str,
    ) -> Result<ConfirmSignUpOutput, IdentityError> {
        self.record("confirm_sign_up");
        if let Some(name) = self.confirm_error.lock().unwrap().clone() {
            return Err(service_error(&name));
        }
        Ok(ConfirmSignUpOutput {
            is_sign_up_complete: true,
        })
    }

    async fn auto_sign_in(&self) -> Result<SignInOutput, IdentityError> {
        self.record("auto_sign_in");
        if self.auto_sign_in_fails.load(Ordering::SeqCst) {
            return Err(IdentityError::AutoSignInUnavailable);
        }
        Ok(self.signed_in(EMAIL))
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.record("sign_out");
        *self.user.lock().unwrap() = None;
        *self.token.lock().unwrap() = None;
        self.emit(HubEvent::SignedOut);
        if self.sign_out_fails.load(Ordering::SeqCst) {
            return Err(service_error("InternalErrorException"));
        }
        Ok(())
    }

    async fn get_current_user(&self) -> Result<AuthUser, IdentityError> {
        self.record("get_current_user");
        self.user
            .lock()
            .unwrap()
            .clone()
            .ok_or(IdentityError::UserUnauthenticated)
    }

    async fn fetch_session(&self) -> Result<AuthSession, IdentityError> {
        self.record("fetch_session");
        if self.refresh_fails.load(Ordering::SeqCst) && self.token.lock().unwrap().is_some() {
            *self.user.lock().unwrap() = None;
            *self.token.lock().unwrap() = None;
            self.emit(HubEvent::TokenRefreshFailure);
            return Err(service_error("NotAuthorizedException"));
        }
        let token = self.token.lock().unwrap().clone();
        Ok(AuthSession {
            tokens: token.map(|t| AuthTokens::new(t, None, None, 3600)),
        })
    }

    fn events(&self) -> broadcast::Receiver<HubEvent> {
        self.events.subscribe()
    }
}
