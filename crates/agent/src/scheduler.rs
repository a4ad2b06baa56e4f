use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Lifecycle of a scheduled unit of work.
///
/// Pending and Running are the only non-terminal states. The scheduler
/// records transitions; driving the work is the executor's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A tracked work item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiTask {
    pub id: String,
    pub name: String,
    pub status: TaskStatus,
    pub priority: i32,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl AiTask {
    pub fn new(name: &str, priority: i32) -> Self {
        Self {
            id: String::new(),
            name: name.to_string(),
            status: TaskStatus::Pending,
            priority,
            start_time: None,
            end_time: None,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }
}

/// Thread-safe registry of task lifecycle records.
///
/// "Not found" conditions never error; they return `false`/`None`.
/// Terminal records accumulate until [`clear_completed_tasks`] sweeps
/// them, so callers must invoke the sweep periodically.
///
/// [`clear_completed_tasks`]: TaskScheduler::clear_completed_tasks
#[derive(Clone)]
pub struct TaskScheduler {
    tasks: Arc<Mutex<HashMap<String, AiTask>>>,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register a task. An empty id gets a generated one; an id
    /// collision is last-write-wins. Status always starts Pending.
    pub async fn schedule_task(&self, mut task: AiTask) -> String {
        if task.id.is_empty() {
            task.id = uuid::Uuid::new_v4().to_string();
        }
        task.status = TaskStatus::Pending;
        let id = task.id.clone();
        let mut tasks = self.tasks.lock().await;
        tasks.insert(id.clone(), task);
        debug!(id = %id, "task scheduled");
        id
    }

    /// Mark a task cancelled. Returns false for unknown ids. A terminal
    /// status may be overwritten; the scheduler is deliberately
    /// permissive here.
    pub async fn cancel_task(&self, task_id: &str) -> bool {
        let mut tasks = self.tasks.lock().await;
        match tasks.get_mut(task_id) {
            Some(task) => {
                task.status = TaskStatus::Cancelled;
                task.end_time = Some(Utc::now());
                debug!(id = %task_id, "task cancelled");
                true
            }
            None => false,
        }
    }

    /// Record that the executor started the task.
    pub async fn mark_running(&self, task_id: &str) {
        let mut tasks = self.tasks.lock().await;
        if let Some(task) = tasks.get_mut(task_id) {
            task.status = TaskStatus::Running;
            task.start_time = Some(Utc::now());
        }
    }

    /// Record successful completion.
    pub async fn mark_completed(&self, task_id: &str) {
        let mut tasks = self.tasks.lock().await;
        if let Some(task) = tasks.get_mut(task_id) {
            task.status = TaskStatus::Completed;
            task.end_time = Some(Utc::now());
        }
    }

    /// Record failure.
    pub async fn mark_failed(&self, task_id: &str) {
        let mut tasks = self.tasks.lock().await;
        if let Some(task) = tasks.get_mut(task_id) {
            task.status = TaskStatus::Failed;
            task.end_time = Some(Utc::now());
        }
    }

    pub async fn get_task(&self, task_id: &str) -> Option<AiTask> {
        let tasks = self.tasks.lock().await;
        tasks.get(task_id).cloned()
    }

    /// All tasks still Pending or Running, highest priority first.
    pub async fn get_active_tasks(&self) -> Vec<AiTask> {
        let tasks = self.tasks.lock().await;
        let mut active: Vec<AiTask> = tasks
            .values()
            .filter(|t| !t.status.is_terminal())
            .cloned()
            .collect();
        active.sort_by(|a, b| b.priority.cmp(&a.priority));
        active
    }

    pub async fn list_tasks(&self) -> Vec<AiTask> {
        let tasks = self.tasks.lock().await;
        let mut all: Vec<AiTask> = tasks.values().cloned().collect();
        all.sort_by(|a, b| b.priority.cmp(&a.priority));
        all
    }

    /// Manual garbage collection: remove every terminal record. Returns
    /// how many were removed.
    pub async fn clear_completed_tasks(&self) -> usize {
        let mut tasks = self.tasks.lock().await;
        let before = tasks.len();
        tasks.retain(|_, t| !t.status.is_terminal());
        let removed = before - tasks.len();
        if removed > 0 {
            debug!(removed, "cleared terminal tasks");
        }
        removed
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}
