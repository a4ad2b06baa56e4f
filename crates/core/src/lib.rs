pub mod config;
pub mod error;
pub mod event;
pub mod paths;
pub mod response;

pub use config::{AuthConfig, BackendConfig, BusConfig, Config, MemoryConfig};
pub use error::{Error, Result};
pub use event::{InsightEvent, MemoryEvent};
pub use paths::Paths;
pub use response::{AgentKind, AgentResponse, PromptContext, RequestIntent, ResponseStatus};
