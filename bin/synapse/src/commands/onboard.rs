use std::io::{self, Write};
use synapse_core::{Config, Paths};

pub async fn run(force: bool) -> anyhow::Result<()> {
    let paths = Paths::new();

    if paths.config_file().exists() && !force {
        print!("Config already exists. Overwrite? [y/N] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    paths.ensure_dirs()?;

    let config = Config::default();
    config.save(&paths.config_file())?;
    println!("✓ Created config: {}", paths.config_file().display());

    println!();
    println!("Next steps:");
    println!(
        "  1. Edit {} to add your API keys",
        paths.config_file().display()
    );
    println!("  2. Run `synapse status` to verify configuration");
    println!("  3. Run `synapse generate \"your prompt\"` to dispatch a request");

    Ok(())
}
