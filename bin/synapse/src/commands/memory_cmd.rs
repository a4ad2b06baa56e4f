use synapse_core::{AgentKind, Config, Paths};
use synapse_storage::{MemoryItem, MemoryQuery, MemoryStore};

/// The store itself is process-lifetime only; the CLI keeps a JSON
/// snapshot next to the config so separate invocations see the same
/// items.
fn load_store(paths: &Paths, config: &Config) -> anyhow::Result<MemoryStore> {
    let store = MemoryStore::new(&config.memory);
    let file = paths.memory_file();
    if file.exists() {
        let content = std::fs::read_to_string(&file)?;
        let items: Vec<MemoryItem> = serde_json::from_str(&content)?;
        // Oldest first so the recent-access window ends on the newest.
        for item in items.into_iter().rev() {
            store.store(item);
        }
    }
    Ok(store)
}

fn save_store(paths: &Paths, store: &MemoryStore) -> anyhow::Result<()> {
    paths.ensure_dirs()?;
    let content = serde_json::to_string_pretty(&store.snapshot())?;
    std::fs::write(paths.memory_file(), content)?;
    Ok(())
}

pub async fn store(key: &str, value: &str) -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = Config::load_or_default(&paths)?;
    let memory = load_store(&paths, &config)?;

    let id = memory.store_kv(key, value);
    save_store(&paths, &memory)?;
    println!("Stored {}", id);
    Ok(())
}

pub async fn query(text: &str, agent: Option<String>) -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = Config::load_or_default(&paths)?;
    let memory = load_store(&paths, &config)?;

    let mut query = MemoryQuery::for_text(text);
    if let Some(agent) = agent {
        let kind = AgentKind::from_str(&agent)
            .ok_or_else(|| anyhow::anyhow!("unknown agent kind: {}", agent))?;
        query = query.with_agents(vec![kind]);
    }

    let result = memory.retrieve(query);
    if result.items.is_empty() {
        println!("No items.");
        return Ok(());
    }
    for item in &result.items {
        println!(
            "{}  [{}] {}",
            item.timestamp.format("%Y-%m-%d %H:%M:%S"),
            item.agent.as_str(),
            item.content
        );
    }
    println!();
    println!("{} item(s).", result.total);
    Ok(())
}

pub async fn stats() -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = Config::load_or_default(&paths)?;
    let memory = load_store(&paths, &config)?;

    let stats = memory.stats();
    println!("Items:   {}", stats.total_items);
    println!("Size:    {} bytes", stats.total_size);
    if let Some(oldest) = stats.oldest_entry {
        println!("Oldest:  {}", oldest.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(newest) = stats.newest_entry {
        println!("Newest:  {}", newest.format("%Y-%m-%d %H:%M:%S"));
    }
    Ok(())
}

pub async fn delete(key: &str) -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = Config::load_or_default(&paths)?;
    let memory = load_store(&paths, &config)?;

    if memory.delete(key) {
        save_store(&paths, &memory)?;
        println!("Deleted {}", key);
    } else {
        println!("No item with key {}", key);
    }
    Ok(())
}
