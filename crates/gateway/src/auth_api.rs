use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use synapse_core::{Error, Result};

use crate::token::TokenSet;

/// Result of asking the auth service for a new token pair.
///
/// `Rejected` means the service answered and said no; the stored tokens
/// are unusable. A transport failure is an `Err` instead, and existing
/// tokens are kept.
#[derive(Debug)]
pub enum RefreshOutcome {
    Granted(TokenSet),
    Rejected,
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshOutcome>;
}

/// Auth service client speaking the JSON refresh endpoint.
pub struct HttpAuthApi {
    client: Client,
    base_url: String,
}

impl HttpAuthApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshOutcome> {
        let response = self
            .client
            .post(format!("{}/auth/refresh", self.base_url))
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .map_err(|e| Error::Gateway(format!("token refresh request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = %status, "token refresh rejected");
            return Ok(RefreshOutcome::Rejected);
        }

        let tokens: TokenSet = response
            .json()
            .await
            .map_err(|e| Error::Gateway(format!("token refresh parse failed: {}", e)))?;
        Ok(RefreshOutcome::Granted(tokens))
    }
}
