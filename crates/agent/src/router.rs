use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

use synapse_core::event::InsightEvent;
use synapse_core::response::{AgentKind, AgentResponse, PromptContext, RequestIntent};
use synapse_core::{Error, Result};
use synapse_providers::Specialist;
use synapse_storage::MemoryStore;

use crate::bus::InsightBus;
use crate::fusion::fuse_responses;

/// How a prompt is dispatched across the specialist pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStrategy {
    /// Route to the single specialist whose keywords match first.
    BestFit,
    /// Fan out to architect, reasoner and creative, then fuse.
    MultiModelFusion,
    /// Force the creative specialist.
    CreativeOnly,
    /// Force the architect with a technical framing.
    AnalyticalOnly,
}

impl FromStr for GenerationStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "best-fit" | "best_fit" => Ok(GenerationStrategy::BestFit),
            "fusion" | "multi-model-fusion" => Ok(GenerationStrategy::MultiModelFusion),
            "creative" => Ok(GenerationStrategy::CreativeOnly),
            "analytical" => Ok(GenerationStrategy::AnalyticalOnly),
            other => Err(Error::Validation(format!(
                "unknown generation strategy: {}",
                other
            ))),
        }
    }
}

/// Keyword routing table, consulted top to bottom. The first rule whose
/// keyword appears in the lowercased prompt wins, so "design" reaches
/// the creative specialist even though later rules also mention it.
const ROUTING_RULES: &[(AgentKind, &[&str])] = &[
    (AgentKind::Architect, &["code", "build", "architecture"]),
    (AgentKind::Reasoner, &["remember", "reason", "logic"]),
    (AgentKind::Creative, &["design", "pattern", "creative"]),
    (AgentKind::Instructor, &["summarize", "instruct"]),
];

/// Pick the specialist for a prompt via substring keyword match.
/// Prompts that match no rule default to the creative specialist.
pub fn determine_best_agent(prompt: &str) -> AgentKind {
    let lowered = prompt.to_lowercase();
    for (kind, keywords) in ROUTING_RULES {
        if keywords.iter().any(|kw| lowered.contains(kw)) {
            return *kind;
        }
    }
    AgentKind::Creative
}

/// Dispatches prompts to specialists, records interactions in memory and
/// publishes lifecycle events on the bus.
pub struct Router {
    specialists: HashMap<AgentKind, Arc<dyn Specialist>>,
    memory: MemoryStore,
    bus: Arc<InsightBus>,
}

impl Router {
    pub fn new(
        specialists: HashMap<AgentKind, Arc<dyn Specialist>>,
        memory: MemoryStore,
        bus: Arc<InsightBus>,
    ) -> Self {
        Self {
            specialists,
            memory,
            bus,
        }
    }

    /// Run one generation round under the given strategy. The returned
    /// string is the user-facing output; the interaction is recorded in
    /// memory on success.
    pub async fn generate(
        &self,
        prompt: &str,
        strategy: GenerationStrategy,
        context: &str,
    ) -> Result<String> {
        info!(strategy = ?strategy, "generation started");
        let output = match strategy {
            GenerationStrategy::BestFit => {
                let kind = determine_best_agent(prompt);
                debug!(agent = %kind, "best-fit routing");
                let response = self
                    .call_specialist(kind, PromptContext::new(prompt, context, RequestIntent::Text))
                    .await?;
                response.content
            }
            GenerationStrategy::MultiModelFusion => {
                let calls = [
                    (AgentKind::Architect, RequestIntent::Architectural),
                    (AgentKind::Reasoner, RequestIntent::Reasoning),
                    (AgentKind::Creative, RequestIntent::Pattern),
                ];
                let futures = calls.iter().map(|(kind, intent)| {
                    self.call_specialist(*kind, PromptContext::new(prompt, context, *intent))
                });
                let responses: Vec<AgentResponse> = futures::future::join_all(futures)
                    .await
                    .into_iter()
                    .collect::<Result<Vec<_>>>()?;
                fuse_responses(&responses)
            }
            GenerationStrategy::CreativeOnly => {
                let response = self
                    .call_specialist(
                        AgentKind::Creative,
                        PromptContext::new(prompt, context, RequestIntent::Creative),
                    )
                    .await?;
                format!("[Creative Synthesis]\n{}", response.content)
            }
            GenerationStrategy::AnalyticalOnly => {
                let response = self
                    .call_specialist(
                        AgentKind::Architect,
                        PromptContext::new(prompt, context, RequestIntent::Technical),
                    )
                    .await?;
                format!("[Analytical Breakdown]\n{}", response.content)
            }
        };

        self.memory.store_interaction(prompt, &output);
        Ok(output)
    }

    async fn call_specialist(
        &self,
        kind: AgentKind,
        ctx: PromptContext,
    ) -> Result<AgentResponse> {
        let specialist = self
            .specialists
            .get(&kind)
            .ok_or_else(|| Error::NotFound(format!("no specialist for {}", kind)))?;

        self.bus.publish(InsightEvent::agent_invoked(kind));
        match specialist.invoke(&ctx).await {
            Ok(response) => {
                self.bus.publish(InsightEvent::response_received(
                    &response.content,
                    response.confidence,
                ));
                Ok(response)
            }
            Err(err) => {
                self.bus.publish(InsightEvent::error(&err.to_string()));
                Err(err)
            }
        }
    }
}
