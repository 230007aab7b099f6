//! `restyle serve`: run the HTTP handler.
//!
//! Startup sequence:
//! 1. Apply `--host` / `--port` on top of the loaded config
//! 2. Build the pipeline (Supabase-gated, open, or `--dev` in-memory gated)
//! 3. Bind, serve, and stop on Ctrl+C

use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::{info, warn};

use restyle_accounts::MemoryAccounts;
use restyle_core::config::Config;
use restyle_core::Identity;
use restyle_handler::{router, serve, AccountGate, ConvertPipeline};
use restyle_providers::create_provider;

use crate::helpers;

/// Bearer token accepted by `serve --dev`.
pub const DEV_TOKEN: &str = "restyle-dev-token";
const DEV_USER_ID: &str = "00000000-0000-4000-8000-000000000dev";
const DEV_EMAIL: &str = "dev@localhost";

pub struct ServeOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub dev: bool,
}

/// Run the server until Ctrl+C.
pub async fn run(mut config: Config, options: ServeOptions) -> Result<()> {
    if let Some(host) = options.host {
        config.server.host = host;
    }
    if let Some(port) = options.port {
        config.server.port = port;
    }

    let pipeline = if options.dev {
        dev_pipeline(&config)?
    } else {
        ConvertPipeline::from_config(&config).context("failed to build conversion pipeline")?
    };

    let generator = pipeline.generator();
    if !generator.is_configured() {
        warn!(
            provider = generator.display_name(),
            env_key = generator.env_key(),
            "provider API key is not set, conversions will fail with API_KEY_MISSING"
        );
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    helpers::print_banner();
    println!("  {:<12} http://{}{}", "Convert:".bold(), addr, config.server.route);
    println!("  {:<12} http://{}/health", "Health:".bold(), addr);
    println!(
        "  {:<12} {} ({})",
        "Provider:".bold(),
        generator.display_name(),
        generator.model()
    );
    let mode = match (options.dev, pipeline.is_gated()) {
        (true, _) => "dev accounts (in-memory)".yellow().to_string(),
        (false, true) => "accounts (Supabase)".green().to_string(),
        (false, false) => "open (no auth)".dimmed().to_string(),
    };
    println!("  {:<12} {}", "Mode:".bold(), mode);
    if options.dev {
        println!("  {:<12} Authorization: Bearer {}", "Dev token:".bold(), DEV_TOKEN.cyan());
    }
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    info!(%addr, route = %config.server.route, gated = pipeline.is_gated(), "starting server");

    let app = router(Arc::new(pipeline), &config.server.route);
    serve(listener, app, shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

/// Pipeline gated by an in-memory store holding one dev user.
fn dev_pipeline(config: &Config) -> Result<ConvertPipeline> {
    let generator = create_provider(&config.provider, &config.providers)
        .map_err(|e| anyhow::anyhow!(e))?;
    let quota = config.accounts.default_daily_quota;
    let store = Arc::new(dev_accounts(quota));

    Ok(ConvertPipeline::new(generator, config.conversion.clone())
        .with_accounts(AccountGate::from_store(store, quota)))
}

fn dev_accounts(quota: i64) -> MemoryAccounts {
    MemoryAccounts::new()
        .with_user(DEV_TOKEN, Identity::new(DEV_USER_ID, Some(DEV_EMAIL)))
        .with_profile(DEV_USER_ID, quota)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    println!();
    println!("{}", "Shutting down...".yellow());
}
