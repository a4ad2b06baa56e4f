use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use synapse_core::{Error, Result};

use crate::auth_api::{AuthApi, RefreshOutcome};
use crate::token::TokenStore;

/// A request to be executed with bearer authentication.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub method: String,
    pub url: String,
    pub body: Option<serde_json::Value>,
}

impl GatewayRequest {
    pub fn get(url: &str) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.to_string(),
            body: None,
        }
    }

    pub fn post(url: &str, body: serde_json::Value) -> Self {
        Self {
            method: "POST".to_string(),
            url: url.to_string(),
            body: Some(body),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: String,
}

impl GatewayResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Transport seam. Production uses [`ReqwestDispatch`]; tests swap in a
/// scripted implementation.
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn dispatch(
        &self,
        request: &GatewayRequest,
        bearer: Option<&str>,
    ) -> Result<GatewayResponse>;
}

pub struct ReqwestDispatch {
    client: Client,
}

impl ReqwestDispatch {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for ReqwestDispatch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Dispatch for ReqwestDispatch {
    async fn dispatch(
        &self,
        request: &GatewayRequest,
        bearer: Option<&str>,
    ) -> Result<GatewayResponse> {
        let method: reqwest::Method = request
            .method
            .parse()
            .map_err(|_| Error::Gateway(format!("invalid method: {}", request.method)))?;

        let mut builder = self.client.request(method, &request.url);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Gateway(format!("request to {} failed: {}", request.url, e)))?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Ok(GatewayResponse { status, body })
    }
}

/// Bearer-injecting request gateway with single-flight token refresh.
///
/// Auth-service paths pass through untouched. Everything else gets the
/// current access token; a 401 triggers at most one refresh and one
/// retry. Concurrent 401s share a single refresh: whoever wins the lock
/// refreshes, the rest observe the already-rotated token and reuse it.
pub struct AuthGateway {
    dispatch: Arc<dyn Dispatch>,
    tokens: Arc<dyn TokenStore>,
    auth_api: Arc<dyn AuthApi>,
    auth_paths: Vec<String>,
    refresh_lock: Mutex<()>,
}

impl AuthGateway {
    pub fn new(
        dispatch: Arc<dyn Dispatch>,
        tokens: Arc<dyn TokenStore>,
        auth_api: Arc<dyn AuthApi>,
        auth_paths: Vec<String>,
    ) -> Self {
        Self {
            dispatch,
            tokens,
            auth_api,
            auth_paths,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Execute a request with bearer injection and one-shot retry.
    pub async fn execute(&self, request: &GatewayRequest) -> Result<GatewayResponse> {
        if self.is_auth_path(&request.url) {
            return self.dispatch.dispatch(request, None).await;
        }

        let access = match self.tokens.access_token() {
            Some(token) if !token.is_empty() => token,
            _ => {
                // No token is not an error; the request simply goes out
                // unauthenticated.
                debug!(url = %request.url, "no access token, proceeding unauthenticated");
                return self.dispatch.dispatch(request, None).await;
            }
        };

        let response = self.dispatch.dispatch(request, Some(&access)).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        debug!(url = %request.url, "access token rejected, refreshing");
        match self.refresh_single_flight(&access).await {
            Some(fresh) => self.dispatch.dispatch(request, Some(&fresh)).await,
            None => Ok(response),
        }
    }

    fn is_auth_path(&self, url: &str) -> bool {
        let path = url.split('?').next().unwrap_or(url);
        self.auth_paths.iter().any(|p| path.ends_with(p.as_str()))
    }

    /// Refresh the token pair, collapsing concurrent callers into one
    /// refresh. `stale` is the access token the caller just failed with;
    /// if the stored token already differs, another caller refreshed
    /// while we waited for the lock.
    async fn refresh_single_flight(&self, stale: &str) -> Option<String> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(current) = self.tokens.access_token() {
            if current != stale {
                debug!("token already rotated by concurrent refresh");
                return Some(current);
            }
        }

        let refresh = self.tokens.refresh_token().filter(|t| !t.is_empty())?;
        match self.auth_api.refresh(&refresh).await {
            Ok(RefreshOutcome::Granted(tokens)) => {
                let access = tokens.access_token.clone();
                self.tokens.update(tokens);
                Some(access)
            }
            Ok(RefreshOutcome::Rejected) => {
                // The service declined; the pair is dead.
                warn!("token refresh rejected, clearing stored tokens");
                self.tokens.clear();
                None
            }
            Err(err) => {
                // Transport trouble is transient; keep the tokens for a
                // later attempt.
                warn!(error = %err, "token refresh failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{InMemoryTokenStore, TokenSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Dispatch that answers 200 only for the named bearer token and 401
    /// for anything else, counting calls.
    struct FakeDispatch {
        valid_bearer: String,
        calls: AtomicUsize,
    }

    impl FakeDispatch {
        fn accepting(valid_bearer: &str) -> Self {
            Self {
                valid_bearer: valid_bearer.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Dispatch for FakeDispatch {
        async fn dispatch(
            &self,
            _request: &GatewayRequest,
            bearer: Option<&str>,
        ) -> Result<GatewayResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let status = match bearer {
                Some(token) if token == self.valid_bearer => 200,
                Some(_) => 401,
                None => 200,
            };
            Ok(GatewayResponse {
                status,
                body: String::new(),
            })
        }
    }

    struct CountingAuthApi {
        refreshes: AtomicUsize,
        outcome: fn() -> RefreshOutcome,
    }

    impl CountingAuthApi {
        fn granting() -> Self {
            Self {
                refreshes: AtomicUsize::new(0),
                outcome: || RefreshOutcome::Granted(TokenSet::new("new", "new-refresh")),
            }
        }

        fn rejecting() -> Self {
            Self {
                refreshes: AtomicUsize::new(0),
                outcome: || RefreshOutcome::Rejected,
            }
        }
    }

    #[async_trait]
    impl AuthApi for CountingAuthApi {
        async fn refresh(&self, _refresh_token: &str) -> Result<RefreshOutcome> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            // Long enough for concurrent callers to queue on the lock.
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok((self.outcome)())
        }
    }

    fn gateway(
        dispatch: Arc<FakeDispatch>,
        tokens: Arc<InMemoryTokenStore>,
        auth_api: Arc<CountingAuthApi>,
    ) -> AuthGateway {
        AuthGateway::new(
            dispatch,
            tokens,
            auth_api,
            vec![
                "/auth/login".to_string(),
                "/auth/refresh".to_string(),
                "/auth/register".to_string(),
            ],
        )
    }

    #[tokio::test]
    async fn test_auth_paths_bypass_bearer_injection() {
        let dispatch = Arc::new(FakeDispatch::accepting("tok"));
        let tokens = Arc::new(InMemoryTokenStore::new());
        let gw = gateway(dispatch.clone(), tokens, Arc::new(CountingAuthApi::granting()));

        let response = gw
            .execute(&GatewayRequest::post(
                "https://api.test/auth/login?next=home",
                serde_json::json!({}),
            ))
            .await
            .unwrap();

        // No stored token, yet the call goes through without bearer.
        assert_eq!(response.status, 200);
        assert_eq!(dispatch.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_token_proceeds_unauthenticated() {
        let dispatch = Arc::new(FakeDispatch::accepting("tok"));
        let tokens = Arc::new(InMemoryTokenStore::new());
        let gw = gateway(dispatch.clone(), tokens, Arc::new(CountingAuthApi::granting()));

        let response = gw
            .execute(&GatewayRequest::get("https://api.test/api/data"))
            .await
            .unwrap();

        // The request goes out exactly once, with no bearer attached.
        assert_eq!(response.status, 200);
        assert_eq!(dispatch.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_refresh_token_skips_refresh() {
        let dispatch = Arc::new(FakeDispatch::accepting("never"));
        let tokens = Arc::new(InMemoryTokenStore::with_tokens("old", ""));
        let auth_api = Arc::new(CountingAuthApi::granting());
        let gw = gateway(dispatch.clone(), tokens, auth_api.clone());

        let response = gw
            .execute(&GatewayRequest::get("https://api.test/api/data"))
            .await
            .unwrap();

        // Nothing to refresh with; the original 401 comes back and the
        // auth service is never called.
        assert_eq!(response.status, 401);
        assert_eq!(dispatch.calls.load(Ordering::SeqCst), 1);
        assert_eq!(auth_api.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unauthorized_refreshes_and_retries_once() {
        let dispatch = Arc::new(FakeDispatch::accepting("new"));
        let tokens = Arc::new(InMemoryTokenStore::with_tokens("old", "refresh"));
        let auth_api = Arc::new(CountingAuthApi::granting());
        let gw = gateway(dispatch.clone(), tokens.clone(), auth_api.clone());

        let response = gw
            .execute(&GatewayRequest::get("https://api.test/api/data"))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(dispatch.calls.load(Ordering::SeqCst), 2);
        assert_eq!(auth_api.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(tokens.access_token().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_rejected_refresh_clears_tokens_and_returns_401() {
        let dispatch = Arc::new(FakeDispatch::accepting("never"));
        let tokens = Arc::new(InMemoryTokenStore::with_tokens("old", "refresh"));
        let auth_api = Arc::new(CountingAuthApi::rejecting());
        let gw = gateway(dispatch.clone(), tokens.clone(), auth_api);

        let response = gw
            .execute(&GatewayRequest::get("https://api.test/api/data"))
            .await
            .unwrap();

        assert_eq!(response.status, 401);
        // No retry after a rejected refresh.
        assert_eq!(dispatch.calls.load(Ordering::SeqCst), 1);
        assert!(tokens.access_token().is_none());
        assert!(tokens.refresh_token().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_401s_share_one_refresh() {
        let dispatch = Arc::new(FakeDispatch::accepting("new"));
        let tokens = Arc::new(InMemoryTokenStore::with_tokens("old", "refresh"));
        let auth_api = Arc::new(CountingAuthApi::granting());
        let gw = Arc::new(gateway(dispatch, tokens, auth_api.clone()));

        let a = gw.clone();
        let b = gw.clone();
        let req_one = GatewayRequest::get("https://api.test/api/one");
        let req_two = GatewayRequest::get("https://api.test/api/two");
        let (first, second) = tokio::join!(a.execute(&req_one), b.execute(&req_two));

        assert_eq!(first.unwrap().status, 200);
        assert_eq!(second.unwrap().status, 200);
        assert_eq!(auth_api.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_successful_response_passes_through_untouched() {
        let dispatch = Arc::new(FakeDispatch::accepting("tok"));
        let tokens = Arc::new(InMemoryTokenStore::with_tokens("tok", "refresh"));
        let auth_api = Arc::new(CountingAuthApi::granting());
        let gw = gateway(dispatch.clone(), tokens, auth_api.clone());

        let response = gw
            .execute(&GatewayRequest::get("https://api.test/api/data"))
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(dispatch.calls.load(Ordering::SeqCst), 1);
        assert_eq!(auth_api.refreshes.load(Ordering::SeqCst), 0);
    }
}
