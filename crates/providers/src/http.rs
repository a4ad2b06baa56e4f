use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Mutex;
use tracing::{debug, warn};

use synapse_core::config::BackendConfig;
use synapse_core::response::{AgentKind, AgentResponse, PromptContext, RequestIntent};
use synapse_core::{Error, Result};

use crate::cache::ResponseCache;
use crate::Specialist;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Baseline confidence reported for a successful completion. The chat
/// API carries no score of its own.
const DEFAULT_CONFIDENCE: f64 = 0.85;

/// Specialist backed by an OpenAI-compatible chat-completions endpoint.
pub struct HttpSpecialist {
    client: Client,
    name: String,
    kind: AgentKind,
    api_key: String,
    api_base: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    cache: Mutex<ResponseCache>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl HttpSpecialist {
    pub fn new(kind: AgentKind, config: &BackendConfig) -> Self {
        Self {
            client: Client::new(),
            name: kind.as_str().to_string(),
            kind,
            api_key: config.api_key.clone(),
            api_base: config
                .api_base
                .as_deref()
                .unwrap_or(DEFAULT_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            cache: Mutex::new(ResponseCache::default()),
        }
    }

    fn system_prompt(&self, intent: RequestIntent) -> String {
        let role = match self.kind {
            AgentKind::Architect => "You are an architecture specialist. Answer with concrete structure, interfaces and build steps.",
            AgentKind::Reasoner => "You are a reasoning specialist. Decompose the problem into explicit logical steps before answering.",
            AgentKind::Creative => "You are a creative specialist. Favor novel patterns and design alternatives.",
            AgentKind::Instructor => "You are an instruction specialist. Answer with a concise, ordered set of directions.",
        };
        match intent {
            RequestIntent::Text => role.to_string(),
            other => format!("{} Focus of this request: {:?}.", role, other),
        }
    }

    fn cache_key(ctx: &PromptContext) -> String {
        format!("{:?}|{}|{}", ctx.intent, ctx.context, ctx.prompt)
    }
}

#[async_trait]
impl Specialist for HttpSpecialist {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AgentKind {
        self.kind
    }

    async fn invoke(&self, ctx: &PromptContext) -> Result<AgentResponse> {
        let key = Self::cache_key(ctx);
        {
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(cached) = cache.get(&key) {
                debug!(
                    agent = %self.name,
                    hit_rate = cache.hit_rate(),
                    "response cache hit"
                );
                return Ok(cached);
            }
        }

        let mut messages = vec![serde_json::json!({
            "role": "system",
            "content": self.system_prompt(ctx.intent),
        })];
        if !ctx.context.is_empty() {
            messages.push(serde_json::json!({
                "role": "system",
                "content": format!("Context:\n{}", ctx.context),
            }));
        }
        messages.push(serde_json::json!({
            "role": "user",
            "content": ctx.prompt,
        }));

        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("{} request failed: {}", self.name, e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(agent = %self.name, status = %status, "backend reported failure");
            // Backend-reported failure is a valid response, not an Err.
            return Ok(AgentResponse::failure(
                &format!("{} returned {}: {}", self.name, status, truncate(&detail, 200)),
                &self.name,
                self.kind,
            ));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Provider(format!("{} response parse failed: {}", self.name, e)))?;

        let content = completion
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        let agent_response = AgentResponse::success(&content, DEFAULT_CONFIDENCE, &self.name, self.kind)
            .with_metadata("model", &self.model);

        {
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            cache.insert(&key, agent_response.clone());
        }

        Ok(agent_response)
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        s.chars().take(max_chars).collect()
    } else {
        s.to_string()
    }
}
