use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::response::AgentKind;

/// An insight event published on the bus.
///
/// Events are immutable once created; their lifetime is bounded by the
/// bus replay window, so consumers must not rely on late delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InsightEvent {
    /// A specialist backend was selected and invoked.
    AgentInvoked {
        agent: AgentKind,
        timestamp: DateTime<Utc>,
    },
    /// A backend returned a response.
    ResponseReceived { content: String, confidence: f64 },
    /// Something went wrong inside an agent component.
    Error { message: String },
    /// A memory-related event (store, recall, prune).
    Memory(MemoryEvent),
}

impl InsightEvent {
    pub fn agent_invoked(agent: AgentKind) -> Self {
        Self::AgentInvoked {
            agent,
            timestamp: Utc::now(),
        }
    }

    pub fn response_received(content: &str, confidence: f64) -> Self {
        Self::ResponseReceived {
            content: content.to_string(),
            confidence,
        }
    }

    pub fn error(message: &str) -> Self {
        Self::Error {
            message: message.to_string(),
        }
    }
}

/// A memory event with a visualization importance in 1..=5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEvent {
    pub label: String,
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub importance: u8,
}

impl MemoryEvent {
    pub const MIN_IMPORTANCE: u8 = 1;
    pub const MAX_IMPORTANCE: u8 = 5;

    /// Construct a memory event. Importance outside 1..=5 is rejected,
    /// never clamped.
    pub fn new(label: &str, data: serde_json::Value, importance: u8) -> Result<Self> {
        if !(Self::MIN_IMPORTANCE..=Self::MAX_IMPORTANCE).contains(&importance) {
            return Err(Error::Validation(format!(
                "importance must be between {} and {}, got {}",
                Self::MIN_IMPORTANCE,
                Self::MAX_IMPORTANCE,
                importance
            )));
        }
        Ok(Self {
            label: label.to_string(),
            data,
            timestamp: Utc::now(),
            importance,
        })
    }
}
