use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::paths::Paths;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryConfig {
    /// Hard cap on items returned from one retrieval.
    #[serde(default = "default_max_retrieved_items")]
    pub max_retrieved_items: usize,
    /// Size of the recent-access window kept by the store.
    #[serde(default = "default_recent_access_cap")]
    pub recent_access_cap: usize,
}

fn default_max_retrieved_items() -> usize {
    10
}

fn default_recent_access_cap() -> usize {
    100
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_retrieved_items: default_max_retrieved_items(),
            recent_access_cap: default_recent_access_cap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusConfig {
    /// Events replayed to a new subscriber.
    #[serde(default = "default_replay")]
    pub replay: usize,
    /// Extra buffered slots per subscriber beyond the replay window.
    #[serde(default = "default_extra_buffer")]
    pub extra_buffer: usize,
}

fn default_replay() -> usize {
    10
}

fn default_extra_buffer() -> usize {
    64
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            replay: default_replay(),
            extra_buffer: default_extra_buffer(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    /// Base URL of the authentication service.
    #[serde(default = "default_auth_base")]
    pub base_url: String,
    /// Request paths that bypass bearer injection entirely.
    #[serde(default = "default_auth_paths")]
    pub auth_paths: Vec<String>,
}

fn default_auth_base() -> String {
    "https://api.synapse.local".to_string()
}

fn default_auth_paths() -> Vec<String> {
    vec![
        "/auth/login".to_string(),
        "/auth/refresh".to_string(),
        "/auth/register".to_string(),
    ]
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: default_auth_base(),
            auth_paths: default_auth_paths(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Specialist backends keyed by agent kind name
    /// ("architect" / "reasoner" / "creative" / "instructor").
    #[serde(default)]
    pub backends: HashMap<String, BackendConfig>,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn load_or_default(paths: &Paths) -> Result<Self> {
        let config_path = paths.config_file();
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn backend(&self, name: &str) -> Option<&BackendConfig> {
        self.backends.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.memory.max_retrieved_items, 10);
        assert_eq!(config.memory.recent_access_cap, 100);
        assert_eq!(config.bus.replay, 10);
        assert_eq!(config.bus.extra_buffer, 64);
        assert!(config.auth.auth_paths.iter().any(|p| p == "/auth/refresh"));
    }

    #[test]
    fn test_round_trip() {
        let mut config = Config::default();
        config.backends.insert(
            "creative".to_string(),
            BackendConfig {
                api_key: "k".to_string(),
                model: "test-model".to_string(),
                ..Default::default()
            },
        );
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.backend("creative").unwrap().model, "test-model");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: Config = serde_json::from_str(r#"{"memory":{"maxRetrievedItems":5}}"#).unwrap();
        assert_eq!(parsed.memory.max_retrieved_items, 5);
        assert_eq!(parsed.memory.recent_access_cap, 100);
        assert_eq!(parsed.bus.replay, 10);
    }
}
