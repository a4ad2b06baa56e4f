pub mod bus;
pub mod fusion;
pub mod router;
pub mod scheduler;
pub mod supervisor;

pub use bus::{InsightBus, Subscription};
pub use fusion::{fuse_responses, NO_DATA_STREAMS};
pub use router::{determine_best_agent, GenerationStrategy, Router};
pub use scheduler::{AiTask, TaskScheduler, TaskStatus};
pub use supervisor::spawn_supervised;
