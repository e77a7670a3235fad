//! Configuration for the tenant admin client

use log::warn;
use std::env;
use std::time::Duration;

use tenant_admin_identity::IdentityConfig;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_REVALIDATE_SECS: u64 = 60;

/// Configuration for the tenant admin client
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Base URL of the admin API
    pub api_url: String,

    /// Identity provider user pool identifier
    pub user_pool_id: String,

    /// Identity provider app client identifier
    pub client_id: String,

    /// Override for the identity provider endpoint
    pub identity_endpoint: Option<String>,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// How often the tenant list is re-fetched in the background
    pub revalidate_interval: Duration,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_pool_id: String::new(),
            client_id: String::new(),
            identity_endpoint: None,
            request_timeout: Some(Duration::from_secs(30)),
            revalidate_interval: Duration::from_secs(DEFAULT_REVALIDATE_SECS),
        }
    }
}

impl AdminConfig {
    /// Read the configuration from the process environment.
    ///
    /// Missing identity settings fall back to empty strings; the client still
    /// starts and sign-in fails later. A warning is logged for each one.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("ADMIN_API_URL") {
            if !url.is_empty() {
                config.api_url = url;
            }
        }

        config.user_pool_id = env::var("COGNITO_USER_POOL_ID").unwrap_or_default();
        if config.user_pool_id.is_empty() {
            warn!("COGNITO_USER_POOL_ID is not set");
        }

        config.client_id = env::var("COGNITO_CLIENT_ID").unwrap_or_default();
        if config.client_id.is_empty() {
            warn!("COGNITO_CLIENT_ID is not set");
        }

        config.identity_endpoint = env::var("COGNITO_ENDPOINT").ok().filter(|v| !v.is_empty());

        if let Some(secs) = parse_secs("ADMIN_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(secs) = parse_secs("ADMIN_REVALIDATE_SECS") {
            config.revalidate_interval = Duration::from_secs(secs);
        }

        config
    }

    /// Set the admin API base URL
    pub fn with_api_url(mut self, value: &str) -> Self {
        self.api_url = value.to_string();
        self
    }

    /// Set the user pool identifier
    pub fn with_user_pool_id(mut self, value: &str) -> Self {
        self.user_pool_id = value.to_string();
        self
    }

    /// Set the app client identifier
    pub fn with_client_id(mut self, value: &str) -> Self {
        self.client_id = value.to_string();
        self
    }

    /// Set the identity provider endpoint
    pub fn with_identity_endpoint(mut self, value: &str) -> Self {
        self.identity_endpoint = Some(value.to_string());
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the revalidation interval
    pub fn with_revalidate_interval(mut self, value: Duration) -> Self {
        self.revalidate_interval = value;
        self
    }

    /// Settings handed to the identity client
    pub fn identity(&self) -> IdentityConfig {
        let config = IdentityConfig::new(&self.user_pool_id, &self.client_id);
        match &self.identity_endpoint {
            Some(endpoint) => config.with_endpoint(endpoint),
            None => config,
        }
    }
}

fn parse_secs(name: &str) -> Option<u64> {
    let raw = env::var(name).ok()?;
    match raw.parse::<u64>() {
        Ok(secs) => Some(secs),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a number of seconds", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_api() {
        let config = AdminConfig::default();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert!(config.user_pool_id.is_empty());
        assert_eq!(config.revalidate_interval, Duration::from_secs(60));
    }

    #[test]
    fn identity_config_carries_endpoint_override() {
        let config = AdminConfig::default()
            .with_user_pool_id("us-east-1_pool")
            .with_client_id("client")
            .with_identity_endpoint("http://localhost:9229");

        let identity = config.identity();
        assert_eq!(identity.client_id, "client");
        assert_eq!(identity.endpoint().unwrap(), "http://localhost:9229");
    }
}
