use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Token pair returned by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

fn default_expires_in() -> u64 {
    3600
}

impl TokenSet {
    pub fn new(access_token: &str, refresh_token: &str) -> Self {
        Self {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            token_type: default_token_type(),
            expires_in: default_expires_in(),
        }
    }
}

/// Storage for the current token pair. Implementations must be safe to
/// share across concurrent requests.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;
    fn update(&self, tokens: TokenSet);
    fn clear(&self);
}

#[derive(Debug, Clone)]
struct StoredTokens {
    access: String,
    refresh: String,
}

/// Process-local token store. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryTokenStore {
    tokens: RwLock<Option<StoredTokens>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(access: &str, refresh: &str) -> Self {
        Self {
            tokens: RwLock::new(Some(StoredTokens {
                access: access.to_string(),
                refresh: refresh.to_string(),
            })),
        }
    }
}

impl TokenStore for InMemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.tokens
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|t| t.access.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.tokens
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|t| t.refresh.clone())
    }

    fn update(&self, tokens: TokenSet) {
        let mut guard = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(StoredTokens {
            access: tokens.access_token,
            refresh: tokens.refresh_token,
        });
    }

    fn clear(&self) {
        let mut guard = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}
