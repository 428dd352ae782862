//! Prickly Fig CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run cart database migrations
//! pfig-cli migrate
//!
//! # Seed an API token for a fresh random user
//! pfig-cli seed token
//!
//! # Seed an API token for a known user with a fixed value
//! pfig-cli seed token -u 7f9c0e9a-1b2c-4d3e-8f4a-5b6c7d8e9f0a -t dev-token
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run cart database migrations
//! - `seed token` - Insert an API token usable as a bearer credential

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pfig-cli")]
#[command(author, version, about = "Prickly Fig CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run cart database migrations
    Migrate,
    /// Seed test data
    Seed {
        #[command(subcommand)]
        action: SeedAction,
    },
}

#[derive(Subcommand)]
enum SeedAction {
    /// Insert an API token the cart API will accept as a bearer credential
    Token {
        /// User id to attach the token to (random when omitted)
        #[arg(short, long)]
        user_id: Option<String>,

        /// Token value to insert (random when omitted)
        #[arg(short, long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { action } => match action {
            SeedAction::Token { user_id, token } => {
                commands::seed::token(user_id.as_deref(), token.as_deref()).await?;
            }
        },
    }
    Ok(())
}
