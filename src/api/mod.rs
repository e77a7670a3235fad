//! Client for the admin REST API

mod types;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use std::sync::Arc;
use url::Url;

use crate::error::{Error, Result};
use crate::fetch::Fetch;

pub use types::*;

/// Supplies the bearer token attached to each admin API request
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Current access token; `None` sends the request unauthenticated
    async fn access_token(&self) -> Option<String>;
}

/// Client for the admin API
pub struct AdminApi {
    base_url: Url,
    http_client: Client,
    tokens: Arc<dyn TokenSource>,
}

impl AdminApi {
    pub fn new(api_url: &str, http_client: Client, tokens: Arc<dyn TokenSource>) -> Result<Self> {
        let base_url = Url::parse(api_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!("API URL '{}' cannot be a base", api_url)));
        }

        Ok(Self {
            base_url,
            http_client,
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::config("API URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn fetch_tenant_stats(&self) -> Result<Vec<TenantRecord>> {
        let url = self.endpoint(&["admin", "users", "stats"])?;
        let token = self.tokens.access_token().await;

        Fetch::get(&self.http_client, url)
            .bearer_auth(token.as_deref())
            .execute::<Vec<TenantRecord>>()
            .await
    }

    /// Fetch statistics for every tenant.
    ///
    /// Failures are logged and produce an empty list, so callers cannot tell
    /// "no tenants" from "backend unreachable".
    pub async fn list_tenant_stats(&self) -> Vec<TenantRecord> {
        match self.fetch_tenant_stats().await {
            Ok(tenants) => {
                debug!("Fetched {} tenants", tenants.len());
                tenants
            }
            Err(e) => {
                error!("Error fetching tenant stats: {}", e);
                Vec::new()
            }
        }
    }

    /// Set a tenant's tier. Non-2xx answers are returned as [`Error::Http`].
    pub async fn set_tenant_tier(&self, user_id: &str, tier: TierName) -> Result<TierChangeResponse> {
        let url = self.endpoint(&["admin", "users", user_id, "upgrade"])?;
        let token = self.tokens.access_token().await;

        let bytes = Fetch::post(&self.http_client, url)
            .bearer_auth(token.as_deref())
            .json(&TierChangeRequest { tier_name: tier })?
            .execute_bytes()
            .await?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(TierChangeResponse::default());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}
