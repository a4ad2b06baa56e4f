pub mod memory;

pub use memory::{MemoryItem, MemoryQuery, MemoryRetrievalResult, MemoryStats, MemoryStore};
