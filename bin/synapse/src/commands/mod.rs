pub mod generate;
pub mod memory_cmd;
pub mod onboard;
pub mod status;
pub mod sync;
pub mod tasks_cmd;
