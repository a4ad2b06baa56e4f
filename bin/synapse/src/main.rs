mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "synapse")]
#[command(about = "Multi-agent orchestration with a shared memory substrate", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize synapse configuration
    Onboard {
        /// Force overwrite existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration status
    Status,

    /// Run a generation round through the specialist pool
    Generate {
        /// The prompt to dispatch
        prompt: String,

        /// Dispatch strategy (best-fit, fusion, creative, analytical)
        #[arg(short, long, default_value = "best-fit")]
        strategy: String,

        /// Extra context passed to the specialists
        #[arg(short, long, default_value = "")]
        context: String,
    },

    /// Inspect and manage the memory store
    Memory {
        #[command(subcommand)]
        command: MemoryCommands,
    },

    /// Inspect and manage scheduled tasks
    Tasks {
        #[command(subcommand)]
        command: TasksCommands,
    },

    /// Push memory statistics to the insight service
    Sync,
}

#[derive(Subcommand)]
enum MemoryCommands {
    /// Store a key/value pair
    Store {
        /// Item key
        key: String,
        /// Item value (stored as content)
        value: String,
    },
    /// Query memory items
    Query {
        /// Search text
        text: String,
        /// Filter by agent kind (architect / reasoner / creative / instructor)
        #[arg(long)]
        agent: Option<String>,
    },
    /// Show memory statistics
    Stats,
    /// Delete an item by key
    Delete {
        /// Item key
        key: String,
    },
}

#[derive(Subcommand)]
enum TasksCommands {
    /// List all tracked tasks
    List,
    /// Cancel a task by id
    Cancel {
        /// Task id
        task_id: String,
    },
    /// Remove all terminal task records
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Onboard { force } => {
            commands::onboard::run(force).await?;
        }
        Commands::Status => {
            commands::status::run().await?;
        }
        Commands::Generate {
            prompt,
            strategy,
            context,
        } => {
            commands::generate::run(&prompt, &strategy, &context).await?;
        }
        Commands::Memory { command } => match command {
            MemoryCommands::Store { key, value } => {
                commands::memory_cmd::store(&key, &value).await?;
            }
            MemoryCommands::Query { text, agent } => {
                commands::memory_cmd::query(&text, agent).await?;
            }
            MemoryCommands::Stats => {
                commands::memory_cmd::stats().await?;
            }
            MemoryCommands::Delete { key } => {
                commands::memory_cmd::delete(&key).await?;
            }
        },
        Commands::Tasks { command } => match command {
            TasksCommands::List => {
                commands::tasks_cmd::list().await?;
            }
            TasksCommands::Cancel { task_id } => {
                commands::tasks_cmd::cancel(&task_id).await?;
            }
            TasksCommands::Clear => {
                commands::tasks_cmd::clear().await?;
            }
        },
        Commands::Sync => {
            commands::sync::run().await?;
        }
    }

    Ok(())
}
