//! # Rotation Server - Main Entry Point
//!
//! Runs the rotation engine against a console stand-in for the game host.
//! This entry point handles CLI parsing, configuration loading, and
//! application lifecycle management.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run with default configuration
//! rotation
//!
//! # Point at a server's game directory
//! rotation --game-dir /srv/cs2/game/csgo
//!
//! # Reproducible rotation with verbose logs
//! rotation --seed 42 --log-level debug
//! ```
//!
//! ## Configuration
//!
//! The server loads configuration from a TOML file (default: `config.toml`).
//! If the file doesn't exist, a default configuration will be created.
//! Files older than the supported layout version are rejected and have to
//! be regenerated.
//!
//! ## Console
//!
//! Each stdin line is either a host event (`match-end`, `map-start <map>`),
//! `status`, `help`, `quit`, or an operator command such as `change-map`.
//!
//! ## Signal Handling
//!
//! The server stops on:
//! - SIGINT (Ctrl+C)
//! - SIGTERM (Unix systems)

use tracing::error;

pub mod app;
pub mod cli;
pub mod config;
pub mod console;
pub mod logging;
pub mod signals;

use app::Application;
use cli::CliArgs;
use config::AppConfig;

/// Main entry point for the rotation server.
///
/// # Exit Codes
///
/// * **0**: Successful execution and shutdown
/// * **1**: Error during startup, configuration, or runtime
///
/// Called from the binary's `#[tokio::main]`; it does not start a runtime
/// itself.
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Load configuration to get logging settings
    let loaded = AppConfig::load_from_file(&args.config_path).await;

    let mut logging = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_default();
    if let Some(level) = &args.log_level {
        logging.level = level.clone();
    }

    // Setup logging before anything else
    if let Err(e) = logging::setup_logging(&logging, args.json_logs) {
        eprintln!("❌ Failed to setup logging: {e}");
        std::process::exit(1);
    }

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Failed to load {}: {}", args.config_path.display(), e);
            std::process::exit(1);
        }
    };

    match Application::new(args, config).await {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("❌ Application error: {}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("❌ Failed to start application: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

pub use config::{LoggingSettings, MapGroupSettings, RtvSettings};
