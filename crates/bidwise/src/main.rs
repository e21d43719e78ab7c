// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bidwise - reverse-bidding negotiation service.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use std::path::PathBuf;

use bidwise_config::model::BidwiseConfig;
use bidwise_gateway::TokenAuthenticator;
use clap::{Parser, Subcommand};

/// Bidwise - reverse-bidding negotiation service.
#[derive(Parser, Debug)]
#[command(name = "bidwise", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server.
    Serve,
    /// Mint a bearer token for a user.
    Token {
        /// User identifier embedded in the token.
        user_id: String,
    },
    /// Print the effective configuration with secrets redacted.
    Config,
}

fn load_config(path: Option<&PathBuf>) -> BidwiseConfig {
    let loaded = match path {
        Some(path) => bidwise_config::load_and_validate_path(path),
        None => bidwise_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            bidwise_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Token { user_id }) => {
            match TokenAuthenticator::new(config.auth.token_secret.as_deref()).issue(&user_id) {
                Ok(token) => println!("{token}"),
                Err(e) => {
                    eprintln!("error: {e}");
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config.redacted()) {
            Ok(rendered) => print!("{rendered}"),
            Err(e) => {
                eprintln!("error: failed to render config: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("bidwise: use --help for available commands");
        }
    }
}
