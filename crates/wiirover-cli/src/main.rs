//! `wiirover` – command line front end for the rover.
//!
//! 1. Loads `~/.wiirover/config.toml`, writing the defaults on first run.
//! 2. Builds a simulated rover from that configuration.
//! 3. Drops the user into a REPL that feeds stick samples, range readings
//!    and button presses through the rover.
//! 4. Intercepts **Ctrl-C**, halts the wheels and exits.

mod config;
mod repl;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

fn main() {
    wiirover_runtime::init_tracing();

    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping the rover …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
    }

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let mut cfg = config::Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  {} Default config written to {}",
                    "✓".green().bold(),
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Error saving config".red(), e),
            }
            config::apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            let mut cfg = config::Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    };

    println!();
    println!(
        "  Type {} for a list of commands.\n",
        "/help".bold().cyan()
    );

    repl::run(shutdown, cfg);
}

fn print_banner() {
    println!();
    println!("{}", r#"         _ _                           "#.bold().cyan());
    println!("{}", r#" __ __ _(_|_)_ _ _____ _____ _ _       "#.bold().cyan());
    println!("{}", r#" \ V  V / | | '_/ _ \ V / -_) '_|      "#.bold().cyan());
    println!("{}", r#"  \_/\_/|_|_|_| \___/\_/\___|_|        "#.bold().cyan());
    println!(
        "  {} {}",
        "wiirover".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!();
}
