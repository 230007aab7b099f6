//! `restyle status`: show configuration and provider status.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use restyle_core::config::{get_config_path, load_config};
use restyle_providers::registry::{find_by_name, PROVIDERS};

use crate::helpers::key_marker;

/// Run the status command.
pub fn run(path: Option<&Path>) -> Result<()> {
    let config = load_config(path);
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

    println!();
    println!("{}", "✨ Restyle Status".magenta().bold());
    println!();

    // Config
    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );

    // Server
    println!(
        "  {:<18} {}:{}{}",
        "Listen:".bold(),
        config.server.host,
        config.server.port,
        config.server.route
    );

    // Active provider
    let active = &config.provider.active;
    match find_by_name(active) {
        Some(spec) => {
            let model = config
                .providers
                .get_by_name(spec.name)
                .and_then(|p| p.model.clone())
                .unwrap_or_else(|| spec.default_model.to_string());
            println!("  {:<18} {} ({})", "Provider:".bold(), spec.display_name, model);
        }
        None => println!("  {:<18} {} {}", "Provider:".bold(), active, "(unknown)".red()),
    }
    println!(
        "  {:<18} {} | {} | {}",
        "Parameters:".bold(),
        format!("temp: {}", config.provider.temperature).dimmed(),
        format!("max_tokens: {}", config.provider.max_tokens).dimmed(),
        format!("timeout: {}s", config.provider.timeout_secs).dimmed(),
    );

    // Providers
    println!();
    println!("  {}", "Providers:".bold());
    for spec in PROVIDERS {
        let configured = config
            .providers
            .get_by_name(spec.name)
            .is_some_and(|p| p.is_configured());
        let marker = if spec.name.eq_ignore_ascii_case(active) { "▸" } else { " " };
        println!(
            "   {} {:<18} {} {}",
            marker,
            spec.display_name,
            key_marker(configured),
            spec.env_key.dimmed()
        );
    }

    // Accounts
    println!();
    let accounts = &config.accounts;
    let accounts_status = match (accounts.enabled, accounts.is_configured()) {
        (false, _) => "· disabled (open endpoint)".dimmed().to_string(),
        (true, true) => format!(
            "{} Supabase, {} free conversions/day",
            "✓".green(),
            accounts.default_daily_quota
        ),
        (true, false) => format!("{} enabled but SUPABASE_URL / key missing", "✗".red()),
    };
    println!("  {:<18} {}", "Accounts:".bold(), accounts_status);

    // Conversion
    println!(
        "  {:<18} style: {} | min length: {}",
        "Conversion:".bold(),
        config.conversion.default_style,
        config.conversion.min_input_chars
    );

    println!();

    Ok(())
}
