mod commands;
mod constants;
mod database;
mod error;
mod models;
mod schedule;
mod utils;

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use crate::{
    commands::{AppContext, Cli, dispatch},
    constants::{DEFAULT_DATABASE_URL, DEFAULT_RTCWAKE_PATH, LOG_DIRECTIVE},
    database::Database,
    schedule::Rtcwake,
    utils::messages::format_error,
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    initialize_logging();

    let cli = Cli::parse();

    // Load configuration from environment
    let config = match load_configuration() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Connect to database
    let db = match Database::new(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    let settings = match db.get_settings().await {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load settings: {}", e);
            std::process::exit(1);
        }
    };

    let ctx = AppContext {
        timer: Rtcwake {
            program: config.rtcwake,
            dry_run: config.dry_run,
        },
        db,
        settings,
    };

    if let Err(e) = dispatch(&ctx, cli.command).await {
        error!("Command failed: {}", e);
        eprintln!("{}", format_error(&e.to_string()));
        std::process::exit(1);
    }
}

/// Configuration loaded from environment variables
struct Config {
    database_url: String,
    rtcwake: PathBuf,
    dry_run: bool,
}

/// Initialize the logging system
fn initialize_logging() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match LOG_DIRECTIVE.parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration from environment variables
fn load_configuration() -> Result<Config, Box<dyn std::error::Error>> {
    let database_url =
        std::env::var("WAKERULE_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    let rtcwake = std::env::var("WAKERULE_RTCWAKE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_RTCWAKE_PATH));

    // Optional: log rtcwake/systemctl calls instead of running them
    let dry_run = match std::env::var("WAKERULE_DRY_RUN") {
        Ok(value) => value
            .parse::<bool>()
            .map_err(|_| format!("WAKERULE_DRY_RUN must be true or false, got '{}'", value))?,
        Err(_) => false,
    };

    if dry_run {
        info!("Dry run: no system call will be made");
    }

    Ok(Config {
        database_url,
        rtcwake,
        dry_run,
    })
}
