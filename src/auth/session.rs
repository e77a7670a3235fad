//! Session management for the signed-in operator

use async_trait::async_trait;
use log::{debug, error, warn};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use tenant_admin_identity::{AuthUser, HubEvent, IdentityProvider};

use crate::api::TokenSource;
use crate::auth::error::{AuthError, AuthStep};
use crate::auth::types::{Route, SessionEvent};

/// Snapshot of the store's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<AuthUser>,
    /// True until the first credential check finishes
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

/// Owns the operator's authentication state
///
/// Cloning is cheap and every clone shares the same state. Consumers get
/// navigation requests through [`SessionStore::subscribe`].
#[derive(Clone)]
pub struct SessionStore {
    provider: Arc<dyn IdentityProvider>,
    state: Arc<RwLock<SessionState>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            provider,
            state: Arc::new(RwLock::new(SessionState::default())),
            events,
        }
    }

    /// Receive navigation requests
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: SessionEvent) {
        debug!("Session event: {:?}", event);
        let _ = self.events.send(event);
    }

    /// Ask the provider who is signed in and record the answer
    pub async fn check_user(&self) {
        let user = match self.provider.get_current_user().await {
            Ok(user) => Some(user),
            Err(e) => {
                debug!("No current user: {}", e);
                None
            }
        };

        let mut state = self.state.write().await;
        state.user = user;
        state.loading = false;
    }

    /// Sign in; the session itself is updated when the provider announces it
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        match self.provider.sign_in(email, password).await {
            Ok(output) if output.is_signed_in => Ok(()),
            Ok(output) => Err(AuthError::Unknown(format!(
                "Additional sign-in step required: {}",
                output.challenge.unwrap_or_else(|| "unknown".to_string())
            ))),
            Err(e) => {
                error!("Error signing in: {}", e);
                Err(AuthError::from_provider(AuthStep::SignIn, &e))
            }
        }
    }

    /// Sign out. Always clears the local session, even if the provider fails.
    pub async fn sign_out(&self) {
        // Cleared first so the provider's SignedOut event finds nothing to do
        self.clear().await;
        if let Err(e) = self.provider.sign_out().await {
            error!("Error signing out: {}", e);
        }
        self.publish(SessionEvent::Navigate(Route::Auth));
    }

    /// Fetch the current access token from the provider.
    ///
    /// Never cached: each call goes back to the provider, which refreshes
    /// expired tokens.
    pub async fn get_token(&self) -> Option<String> {
        match self.provider.fetch_session().await {
            Ok(session) => session.access_token().map(str::to_string),
            Err(e) => {
                error!("Error getting access token: {}", e);
                None
            }
        }
    }

    pub async fn current_user(&self) -> Option<AuthUser> {
        self.state.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.user.is_some()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Where a visitor of `route` has to be sent, if anywhere
    pub async fn redirect_for(&self, route: Route) -> Option<Route> {
        let state = self.state.read().await;
        if state.loading {
            return None;
        }
        match (route, state.user.is_some()) {
            (Route::Dashboard, false) => Some(Route::Auth),
            (Route::Auth, true) => Some(Route::Dashboard),
            _ => None,
        }
    }

    async fn clear(&self) -> bool {
        let mut state = self.state.write().await;
        state.loading = false;
        state.user.take().is_some()
    }

    /// Apply a provider hub event
    pub async fn handle_event(&self, event: HubEvent) {
        debug!("Handling hub event {}", event);
        match event {
            HubEvent::SignedIn => {
                self.check_user().await;
                self.publish(SessionEvent::Navigate(Route::Dashboard));
            }
            HubEvent::SignedOut => {
                // A local sign_out() has already cleared and navigated
                if self.clear().await {
                    self.publish(SessionEvent::Navigate(Route::Auth));
                }
            }
            HubEvent::TokenRefresh => self.check_user().await,
            HubEvent::TokenRefreshFailure => {
                self.clear().await;
                self.publish(SessionEvent::Navigate(Route::Auth));
            }
        }
    }

    /// Start consuming provider events on a background task
    pub fn listen(&self) -> HubListener {
        let mut events = self.provider.events();
        let store = self.clone();

        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => store.handle_event(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Hub listener lagged, {} events skipped", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("Hub listener stopped");
        });

        HubListener { handle }
    }
}

#[async_trait]
impl TokenSource for SessionStore {
    async fn access_token(&self) -> Option<String> {
        self.get_token().await
    }
}

/// Subscription to provider events; dropping it unsubscribes
pub struct HubListener {
    handle: JoinHandle<()>,
}

impl HubListener {
    pub fn stop(self) {
        drop(self);
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for HubListener {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
