//! Main entry point for the `EatOff` CLI.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use shared::config::ClientConfig;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{Context, restaurants::FilterArgs};

/// `EatOff` CLI
#[derive(Parser)]
#[command(name = "eatoff", version)]
#[command(about = "Command-line client for the EatOff restaurant platform", long_about = None)]
struct Cli {
    /// Path to a configuration file (yaml, json or toml)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// API base URL, e.g. `http://localhost:5000/api/`
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for the `EatOff` CLI
#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session
    Run(FilterArgs),

    /// Sign in and store the session
    Login {
        /// Account email; prompted for when omitted
        #[arg(long, short)]
        email: Option<String>,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in customer
    Whoami,

    /// List restaurants
    Restaurants(FilterArgs),

    /// Show one restaurant
    Restaurant {
        /// Restaurant identifier
        id: i64,
    },

    /// Show the menu of a restaurant
    Menu {
        /// Restaurant identifier
        id: i64,
    },

    /// Show the voucher packages of a restaurant
    Packages {
        /// Restaurant identifier
        id: i64,
    },

    /// Check that the backend is reachable
    Ping,

    /// Generate a configuration file
    Config {
        /// Format of the configuration file to generate (yaml, json or toml). Defaults to yaml.
        #[arg(long, short)]
        format: Option<String>,
    },

    /// Generate shell completion scripts for the CLI
    Completion {
        /// The shell type for which to generate the completion script (e.g., bash, zsh, fish, powershell)
        #[arg(long, short)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Completion { shell } => {
            commands::completion::generate_completion(*shell);
            return Ok(());
        }
        Commands::Config { format } => {
            return commands::config::generate_config(format.as_deref());
        }
        _ => {}
    }

    let config = ClientConfig::load_config(cli.config, cli.server)
        .context("failed to load configuration")?;
    init_tracing(&config.log_level);
    let ctx = Context::new(config)?;

    match cli.command {
        Commands::Run(filters) => commands::interactive::run(&ctx, filters.into()).await,
        Commands::Login { email } => commands::session::login(&ctx, email).await,
        Commands::Logout => commands::session::logout(&ctx).await,
        Commands::Whoami => commands::session::whoami(&ctx),
        Commands::Restaurants(filters) => commands::restaurants::list(&ctx, filters.into()).await,
        Commands::Restaurant { id } => commands::restaurants::show(&ctx, id).await,
        Commands::Menu { id } => commands::restaurants::menu(&ctx, id).await,
        Commands::Packages { id } => commands::restaurants::packages(&ctx, id).await,
        Commands::Ping => commands::restaurants::ping(&ctx).await,
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}

/// Logs go to stderr so command output stays pipeable.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
