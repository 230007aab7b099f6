//! Shared CLI helpers: path expansion, banner, result printing.

use std::path::PathBuf;

use colored::Colorize;

use restyle_core::Envelope;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print the banner shown when the server starts.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "✨ Restyle".magenta().bold(), version.dimmed());
    println!();
}

/// Print a successful conversion envelope.
pub fn print_conversion(envelope: &Envelope) {
    println!();
    match envelope.converted_text.as_deref() {
        Some(text) if !text.is_empty() => println!("{text}"),
        _ => println!("{}", "(no text)".dimmed()),
    }
    if let Some(usage) = envelope.usage {
        println!();
        println!(
            "{}",
            format!(
                "{} chars in → {} chars out",
                usage.input_length, usage.output_length
            )
            .dimmed()
        );
    }
    println!();
}

/// `✓ (key set)` / `· not configured` marker used by `status`.
pub fn key_marker(configured: bool) -> String {
    if configured {
        format!("{} (key set)", "✓".green())
    } else {
        format!("{}", "· not configured".dimmed())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
