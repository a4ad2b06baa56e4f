use synapse_core::{AgentKind, Config, Paths};

pub async fn run() -> anyhow::Result<()> {
    let paths = Paths::new();

    println!("synapse status");
    println!("==============");
    println!();

    let config_path = paths.config_file();
    let config_exists = config_path.exists();
    println!(
        "Config:    {} {}",
        config_path.display(),
        if config_exists { "✓" } else { "✗ (not found)" }
    );

    if !config_exists {
        println!();
        println!("Run `synapse onboard` to initialize.");
        return Ok(());
    }

    let config = Config::load(&config_path)?;

    println!("Auth base: {}", config.auth.base_url);
    println!(
        "Memory:    retrieval cap {}, recent window {}",
        config.memory.max_retrieved_items, config.memory.recent_access_cap
    );
    println!(
        "Bus:       replay {}, extra buffer {}",
        config.bus.replay, config.bus.extra_buffer
    );
    println!();

    println!("Specialists:");
    for kind in [
        AgentKind::Architect,
        AgentKind::Reasoner,
        AgentKind::Creative,
        AgentKind::Instructor,
    ] {
        let (model, keyed) = match config.backend(kind.as_str()) {
            Some(backend) => (backend.model.clone(), !backend.api_key.is_empty()),
            None => ("(default backend)".to_string(), false),
        };
        println!(
            "  {:<11} {} {}",
            kind.as_str(),
            model,
            if keyed { "✓ configured" } else { "✗ no key" }
        );
    }

    Ok(())
}
