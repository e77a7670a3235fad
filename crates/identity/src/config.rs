use crate::error::IdentityError;

/// Connection settings for the user pool
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// User pool identifier, e.g. `us-east-1_AbCdEf`
    pub user_pool_id: String,

    /// App client identifier
    pub client_id: String,

    /// Explicit endpoint; derived from the pool region when unset
    pub endpoint: Option<String>,

    /// Remember sign-up credentials so `auto_sign_in` can complete the flow
    pub auto_sign_in: bool,
}

impl IdentityConfig {
    pub fn new(user_pool_id: &str, client_id: &str) -> Self {
        Self {
            user_pool_id: user_pool_id.to_string(),
            client_id: client_id.to_string(),
            endpoint: None,
            auto_sign_in: true,
        }
    }

    /// Set an explicit endpoint (local emulators, tests)
    pub fn with_endpoint(mut self, value: &str) -> Self {
        self.endpoint = Some(value.to_string());
        self
    }

    /// Set whether sign-up arms an automatic sign-in
    pub fn with_auto_sign_in(mut self, value: bool) -> Self {
        self.auto_sign_in = value;
        self
    }

    /// Resolve the endpoint requests are posted to
    pub fn endpoint(&self) -> Result<String, IdentityError> {
        if let Some(endpoint) = &self.endpoint {
            return Ok(endpoint.trim_end_matches('/').to_string());
        }

        match self.user_pool_id.split_once('_') {
            Some((region, _)) if !region.is_empty() => {
                Ok(format!("https://cognito-idp.{}.amazonaws.com", region))
            }
            _ => Err(IdentityError::ConfigError(format!(
                "cannot derive region from user pool id '{}'",
                self.user_pool_id
            ))),
        }
    }
}
