use synapse_agent::{AiTask, TaskScheduler, TaskStatus};
use synapse_core::Paths;

/// Task records live in-process; the CLI snapshots them to JSON so the
/// list survives between invocations.
fn load_records(paths: &Paths) -> anyhow::Result<Vec<AiTask>> {
    let file = paths.tasks_file();
    if !file.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(&file)?;
    Ok(serde_json::from_str(&content)?)
}

fn save_records(paths: &Paths, records: &[AiTask]) -> anyhow::Result<()> {
    paths.ensure_dirs()?;
    let content = serde_json::to_string_pretty(records)?;
    std::fs::write(paths.tasks_file(), content)?;
    Ok(())
}

async fn load_scheduler(paths: &Paths) -> anyhow::Result<TaskScheduler> {
    let scheduler = TaskScheduler::new();
    for record in load_records(paths)? {
        let id = record.id.clone();
        let status = record.status;
        scheduler.schedule_task(record).await;
        // schedule_task resets to Pending; restore the recorded state.
        match status {
            TaskStatus::Pending => {}
            TaskStatus::Running => scheduler.mark_running(&id).await,
            TaskStatus::Completed => scheduler.mark_completed(&id).await,
            TaskStatus::Failed => scheduler.mark_failed(&id).await,
            TaskStatus::Cancelled => {
                scheduler.cancel_task(&id).await;
            }
        }
    }
    Ok(scheduler)
}

pub async fn list() -> anyhow::Result<()> {
    let paths = Paths::new();
    let records = load_records(&paths)?;

    if records.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    for task in &records {
        println!(
            "{}  {:<9} p{}  {}",
            task.id, task.status, task.priority, task.name
        );
    }
    Ok(())
}

pub async fn cancel(task_id: &str) -> anyhow::Result<()> {
    let paths = Paths::new();
    let scheduler = load_scheduler(&paths).await?;

    if scheduler.cancel_task(task_id).await {
        save_records(&paths, &scheduler.list_tasks().await)?;
        println!("Cancelled {}", task_id);
    } else {
        println!("No task with id {}", task_id);
    }
    Ok(())
}

pub async fn clear() -> anyhow::Result<()> {
    let paths = Paths::new();
    let scheduler = load_scheduler(&paths).await?;

    let removed = scheduler.clear_completed_tasks().await;
    save_records(&paths, &scheduler.list_tasks().await)?;
    println!("Removed {} task(s).", removed);
    Ok(())
}
