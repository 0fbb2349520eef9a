// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Brigadir - a Telegram dispatch bot for cleaning-service orders.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

mod serve;

/// Brigadir - a Telegram dispatch bot for cleaning-service orders.
#[derive(Parser, Debug)]
#[command(name = "brigadir", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the bot (long polling).
    Serve,
    /// Print the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match brigadir_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            brigadir_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) | None => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("brigadir: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("brigadir: failed to render config: {e}");
                std::process::exit(1);
            }
        },
    }
}
