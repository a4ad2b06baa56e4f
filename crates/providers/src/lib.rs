pub mod cache;
pub mod factory;
pub mod http;

use async_trait::async_trait;
use synapse_core::response::{AgentKind, AgentResponse, PromptContext};
use synapse_core::Result;

/// One specialist backend the router can invoke.
///
/// An `AgentResponse` with `ResponseStatus::Error` is a valid return
/// value (backend-reported failure); `Err` is reserved for transport
/// faults.
#[async_trait]
pub trait Specialist: Send + Sync {
    fn name(&self) -> &str;
    fn kind(&self) -> AgentKind;
    async fn invoke(&self, ctx: &PromptContext) -> Result<AgentResponse>;
}

pub use cache::ResponseCache;
pub use factory::create_specialists;
pub use http::HttpSpecialist;
