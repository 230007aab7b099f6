//! Restyle CLI: entry point.
//!
//! # Commands
//!
//! - `restyle serve [--host] [--port] [--dev] [--logs] [--json-logs]`: run the HTTP handler
//! - `restyle convert -t TEXT [-s STYLE]`: one-shot conversion through the active provider
//! - `restyle status`: show configuration and provider status
//! - `restyle onboard`: write the default config

mod convert;
mod helpers;
mod onboard;
mod serve;
mod status;

use anyhow::Result;
use clap::{Parser, Subcommand};

use restyle_core::config::load_config;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// ✨ Restyle: rewrite text as a Xiaohongshu-style post
#[derive(Parser)]
#[command(name = "restyle", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.restyle/config.json)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP handler
    Serve {
        /// Listen address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Require auth against an in-memory account store with a printed dev token
        #[arg(long, default_value_t = false)]
        dev: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,

        /// Emit logs as JSON lines
        #[arg(long, default_value_t = false)]
        json_logs: bool,
    },

    /// Convert a single text and print the result
    Convert {
        /// Text to convert
        #[arg(short, long)]
        text: String,

        /// Target style (defaults to config `conversion.defaultStyle`)
        #[arg(short, long)]
        style: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Show configuration and provider status
    Status,

    /// Write the default configuration file
    Onboard,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref().map(helpers::expand_tilde);

    match cli.command {
        Commands::Serve {
            host,
            port,
            dev,
            logs,
            json_logs,
        } => {
            init_logging(logs, json_logs);
            let config = load_config(config_path.as_deref());
            serve::run(config, serve::ServeOptions { host, port, dev }).await
        }
        Commands::Convert { text, style, logs } => {
            init_logging(logs, false);
            let config = load_config(config_path.as_deref());
            convert::run(&config, &text, style.as_deref()).await
        }
        Commands::Status => status::run(config_path.as_deref()),
        Commands::Onboard => onboard::run(config_path.as_deref()),
    }
}

/// Initialize tracing/logging. `RUST_LOG` wins over `verbose` when set.
fn init_logging(verbose: bool, json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("restyle=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}
