//! Tenant administration client
//!
//! Operator sign-in against a Cognito user pool, a tenant usage dashboard
//! backed by the admin REST API, and tier management for individual tenants.

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;

use reqwest::Client;
use std::sync::Arc;

use tenant_admin_identity::{CognitoClient, IdentityProvider};

use crate::api::{AdminApi, TokenSource};
use crate::auth::{AuthFlow, SessionStore};
use crate::config::AdminConfig;
use crate::dashboard::Revalidator;
use crate::error::Result;

pub use tenant_admin_identity as identity;

/// Wires the identity client, session store and admin API together
pub struct AdminPortal {
    config: AdminConfig,
    identity: Arc<CognitoClient>,
    session: SessionStore,
    api: Arc<AdminApi>,
}

impl AdminPortal {
    /// Create a portal from explicit configuration
    ///
    /// # Example
    ///
    /// ```
    /// use tenant_admin::{AdminPortal, config::AdminConfig};
    ///
    /// let config = AdminConfig::default()
    ///     .with_api_url("http://localhost:8000")
    ///     .with_user_pool_id("eu-west-1_example")
    ///     .with_client_id("client-id");
    /// let portal = AdminPortal::new(config).unwrap();
    /// assert_eq!(portal.api().base_url().as_str(), "http://localhost:8000/");
    /// ```
    pub fn new(config: AdminConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let identity = Arc::new(CognitoClient::new(config.identity(), http_client.clone()));
        let provider: Arc<dyn IdentityProvider> = identity.clone();
        let session = SessionStore::new(provider);

        let tokens: Arc<dyn TokenSource> = Arc::new(session.clone());
        let api = Arc::new(AdminApi::new(&config.api_url, http_client, tokens)?);

        Ok(Self {
            config,
            identity,
            session,
            api,
        })
    }

    /// Create a portal from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(AdminConfig::from_env())
    }

    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    pub fn identity(&self) -> &Arc<CognitoClient> {
        &self.identity
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn api(&self) -> &Arc<AdminApi> {
        &self.api
    }

    /// A fresh auth page state
    pub fn auth_flow(&self) -> AuthFlow {
        let provider: Arc<dyn IdentityProvider> = self.identity.clone();
        AuthFlow::new(provider, self.session.clone())
    }

    /// Start reloading the tenant list on the configured interval
    pub fn revalidator(&self) -> Revalidator {
        Revalidator::spawn(self.api.clone(), self.config.revalidate_interval)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::api::{AdminApi, TenantRecord, TierName};
    pub use crate::auth::{AuthError, AuthFlow, Route, SessionEvent, SessionStore};
    pub use crate::config::AdminConfig;
    pub use crate::dashboard::{Dashboard, TenantCard, TierChangeOutcome, TierFilter};
    pub use crate::error::Error;
    pub use crate::AdminPortal;
}
