//! `restyle onboard`: write the default configuration.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use restyle_core::config::{get_config_path, save_config, Config};

/// Run the onboard command.
pub fn run(path: Option<&Path>) -> Result<()> {
    println!();
    println!("{}", "✨ Restyle — Setup".magenta().bold());
    println!();

    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

    if write_default_config(&config_path)? {
        println!("  {} created config at {}", "✓".green(), config_path.display());
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    }

    println!();
    println!("{}", "Next steps:".bold());
    println!("  1. Export a provider key, e.g. {}", "DEEPSEEK_API_KEY=sk-...".cyan());
    println!(
        "  2. Optional: set {} and {} and accounts.enabled = true",
        "SUPABASE_URL".cyan(),
        "SUPABASE_SERVICE_ROLE_KEY".cyan()
    );
    println!("  3. Try it: {}", "restyle convert -t \"今天的咖啡很好喝\"".cyan());
    println!("  4. Serve it: {}", "restyle serve --logs".cyan());
    println!();

    Ok(())
}

/// Write `Config::default()` to `path` unless a file is already there.
///
/// Returns whether a file was written.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))
        .with_context(|| format!("failed to write config to {}", path.display()))?;
    Ok(true)
}
