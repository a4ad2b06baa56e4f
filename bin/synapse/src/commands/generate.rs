use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use synapse_agent::{
    spawn_supervised, AiTask, GenerationStrategy, InsightBus, Router, TaskScheduler,
};
use synapse_core::{Config, InsightEvent, Paths};
use synapse_providers::create_specialists;
use synapse_storage::MemoryStore;

pub async fn run(prompt: &str, strategy: &str, context: &str) -> anyhow::Result<()> {
    let strategy: GenerationStrategy = strategy.parse()?;

    let paths = Paths::new();
    let config = Config::load_or_default(&paths)?;

    // Composition root: every collaborator is built here and handed down.
    let memory = MemoryStore::new(&config.memory);
    let bus = Arc::new(InsightBus::new(&config.bus));
    let scheduler = TaskScheduler::new();
    let specialists = create_specialists(&config);
    let router = Router::new(specialists, memory.clone(), bus.clone());

    let token = CancellationToken::new();
    let logger = spawn_logger(&bus, token.clone());

    let task_id = scheduler
        .schedule_task(AiTask::new(&format!("generate:{:?}", strategy), 1))
        .await;
    scheduler.mark_running(&task_id).await;

    let outcome = router.generate(prompt, strategy, context).await;
    match &outcome {
        Ok(_) => scheduler.mark_completed(&task_id).await,
        Err(_) => scheduler.mark_failed(&task_id).await,
    }

    token.cancel();
    let _ = logger.await;
    persist_tasks(&paths, &scheduler).await?;

    println!("{}", outcome?);
    Ok(())
}

/// Append this round's task records to the CLI snapshot so `synapse
/// tasks list` can show them later.
async fn persist_tasks(paths: &Paths, scheduler: &TaskScheduler) -> anyhow::Result<()> {
    let file = paths.tasks_file();
    let mut records: Vec<AiTask> = if file.exists() {
        serde_json::from_str(&std::fs::read_to_string(&file)?)?
    } else {
        Vec::new()
    };
    records.extend(scheduler.list_tasks().await);
    paths.ensure_dirs()?;
    std::fs::write(&file, serde_json::to_string_pretty(&records)?)?;
    Ok(())
}

/// Background observer that logs every bus event for the duration of the
/// generation round.
fn spawn_logger(bus: &Arc<InsightBus>, token: CancellationToken) -> tokio::task::JoinHandle<()> {
    let mut subscription = bus.subscribe();
    spawn_supervised("insight-logger", token, async move {
        while let Some(event) = subscription.recv().await {
            match event {
                InsightEvent::AgentInvoked { agent, .. } => {
                    debug!(agent = %agent, "agent invoked");
                }
                InsightEvent::ResponseReceived { confidence, .. } => {
                    debug!(confidence, "response received");
                }
                InsightEvent::Error { message } => {
                    debug!(message = %message, "agent error");
                }
                InsightEvent::Memory(memory) => {
                    debug!(label = %memory.label, importance = memory.importance, "memory event");
                }
            }
        }
        Ok(())
    })
}
