use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The specialist roles the router can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Code, build and architecture questions.
    Architect,
    /// Recall, reasoning chains, logic decomposition.
    Reasoner,
    /// Patterns, design and creative synthesis. Default route.
    Creative,
    /// Summaries and instruction following.
    Instructor,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Architect => "architect",
            AgentKind::Reasoner => "reasoner",
            AgentKind::Creative => "creative",
            AgentKind::Instructor => "instructor",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "architect" => Some(AgentKind::Architect),
            "reasoner" => Some(AgentKind::Reasoner),
            "creative" => Some(AgentKind::Creative),
            "instructor" => Some(AgentKind::Instructor),
            _ => None,
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome classification of one backend invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    Error,
    Processing,
    Idle,
}

/// What the caller wants from a specialist. Shapes the system prompt sent
/// to the backend; backends are free to ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestIntent {
    Text,
    Architectural,
    Reasoning,
    Pattern,
    Creative,
    Technical,
}

/// A prompt plus the surrounding context handed to a specialist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptContext {
    pub prompt: String,
    #[serde(default)]
    pub context: String,
    pub intent: RequestIntent,
}

impl PromptContext {
    pub fn new(prompt: &str, context: &str, intent: RequestIntent) -> Self {
        Self {
            prompt: prompt.to_string(),
            context: context.to_string(),
            intent,
        }
    }
}

/// Immutable result of one backend invocation.
///
/// An `Error` status is a valid return value, not an exception: callers
/// inspect `status` before trusting `content`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    pub content: String,
    pub agent_name: String,
    pub agent: AgentKind,
    /// Confidence in 0.0..=1.0.
    pub confidence: f64,
    pub status: ResponseStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentResponse {
    pub fn success(content: &str, confidence: f64, agent_name: &str, agent: AgentKind) -> Self {
        Self {
            content: content.to_string(),
            agent_name: agent_name.to_string(),
            agent,
            confidence: confidence.clamp(0.0, 1.0),
            status: ResponseStatus::Success,
            timestamp: Utc::now(),
            metadata: HashMap::new(),
            error: None,
        }
    }

    pub fn failure(message: &str, agent_name: &str, agent: AgentKind) -> Self {
        Self {
            content: String::new(),
            agent_name: agent_name.to_string(),
            agent,
            confidence: 0.0,
            status: ResponseStatus::Error,
            timestamp: Utc::now(),
            metadata: HashMap::new(),
            error: Some(message.to_string()),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}
