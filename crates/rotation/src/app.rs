//! Main application logic and lifecycle management.
//!
//! The `Application` owns the rotation engine and runs the event loop that
//! feeds it console input, fired grace-period timers and shutdown signals.

use crate::cli::CliArgs;
use crate::config::AppConfig;
use crate::console::{handle_line, ConsoleHost, TokioScheduler};
use crate::logging::display_banner;
use crate::signals::wait_for_shutdown_signal;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rotation_engine::{Catalog, RotationEngine};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};

/// Core application state and lifecycle.
///
/// Owns the loaded configuration, the rotation engine and the receiving end
/// of the grace-period timers.
#[derive(Debug)]
pub struct Application {
    /// Loaded application configuration
    config: AppConfig,
    engine: RotationEngine<ChaCha8Rng>,
    /// Generations of grace-period timers that have elapsed
    fired: mpsc::UnboundedReceiver<u64>,
}

impl Application {
    /// Creates the application from a loaded configuration.
    ///
    /// # Arguments
    ///
    /// * `args` - Parsed command-line arguments; their overrides win over the file
    /// * `config` - Configuration loaded from the TOML file
    ///
    /// # Returns
    ///
    /// The ready-to-run application, or an error when validation, path
    /// resolution or catalog loading fails.
    ///
    /// # Process
    ///
    /// 1. Apply command-line argument overrides
    /// 2. Validate merged configuration
    /// 3. Resolve paths and load the catalog
    /// 4. Build the engine with the host and scheduler stand-ins
    pub async fn new(args: CliArgs, mut config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        // Apply CLI overrides
        if let Some(game_dir) = &args.game_dir {
            config.server.game_directory = game_dir.to_string_lossy().to_string();
        }

        if let Some(log_level) = &args.log_level {
            config.logging.level = log_level.clone();
        }

        if args.json_logs {
            config.logging.json_format = true;
        }

        // Validate configuration
        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        } else {
            info!("✅ Configuration loaded and validated successfully");
        }

        display_banner();

        let rotation_config = config.to_rotation_config()?;
        let sources = config.to_catalog_sources()?;
        let catalog = Catalog::load(&sources)?;

        let rng = match args.seed {
            Some(seed) => {
                info!("🎲 Selection seeded with {}", seed);
                ChaCha8Rng::seed_from_u64(seed)
            }
            None => ChaCha8Rng::from_entropy(),
        };

        let host = Arc::new(ConsoleHost::new(config.game_directory()));
        let (scheduler, fired) = TokioScheduler::channel();
        let engine = RotationEngine::new(rotation_config, Arc::new(catalog), host, Arc::new(scheduler), rng);

        info!(
            "📂 Config: {} | Game directory: {}",
            args.config_path.display(),
            config.game_directory().display()
        );

        Ok(Self { config, engine, fired })
    }

    /// Runs the event loop until `quit`, end of input or a shutdown signal.
    ///
    /// Publishes the initial map list and votes, then feeds the engine from
    /// three sources:
    ///
    /// * console lines from stdin
    /// * generations of elapsed grace-period timers
    /// * the shutdown signal
    ///
    /// # Returns
    ///
    /// `Ok(())` on a clean stop, or the error from installing the signal
    /// handlers.
    pub async fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.log_configuration_summary();
        self.engine.start();

        info!("✅ Rotation server is running");
        info!("⌨️ Type 'help' for commands, Ctrl+C to stop");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let shutdown = wait_for_shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        let output = handle_line(&mut self.engine, &line);
                        for reply in &output.lines {
                            println!("{reply}");
                        }
                        if output.quit {
                            break;
                        }
                    }
                    Ok(None) => {
                        info!("📭 Console input closed");
                        break;
                    }
                    Err(e) => {
                        error!("❌ Failed to read console input: {}", e);
                        break;
                    }
                },
                Some(generation) = self.fired.recv() => {
                    self.engine.fire(generation);
                }
                result = &mut shutdown => {
                    result?;
                    break;
                }
            }
        }

        info!(
            "👋 Rotation stopped after {} match(es)",
            self.engine.state().rotation_counter()
        );
        Ok(())
    }

    fn log_configuration_summary(&self) {
        let config = &self.config;
        info!("📋 Configuration Summary:");
        info!("  🗺️ Default map group: {}", config.map_group.default);
        info!("  ⏱️ Map change delay: {}s", config.map_group.delay);
        if config.game_mode.rotation {
            info!(
                "  🎲 Game mode rotation: every {} matches, {}s delay",
                config.game_mode.interval, config.game_mode.delay
            );
        } else {
            info!("  🎲 Game mode rotation: off");
        }
        info!(
            "  🔁 RTV compatibility: {}",
            if config.rtv.enabled { "on" } else { "off" }
        );
        info!("  📚 Catalog: {} map groups, {} game modes, {} settings",
            self.engine.catalog().map_groups().len(),
            self.engine.catalog().game_modes().len(),
            self.engine.catalog().settings().len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const MAP_GROUPS: &str = r#"
"GameModes_Server.txt"
{
    "mapgroups"
    {
        "mg_active"
        {
            "maps"
            {
                "de_dust2"  ""
                "de_mirage" ""
            }
        }
    }
}
"#;

    fn args(seed: Option<u64>) -> CliArgs {
        CliArgs {
            config_path: PathBuf::from("config.toml"),
            game_dir: None,
            log_level: Some("debug".to_string()),
            json_logs: false,
            seed,
        }
    }

    #[tokio::test]
    async fn test_application_creation() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("gamemodes_server.txt"), MAP_GROUPS).unwrap();

        let mut config = AppConfig::default();
        config.server.game_directory = dir.path().display().to_string();
        config.settings.enabled = false;

        let app = Application::new(args(Some(9)), config).await.unwrap();
        assert_eq!(app.config.logging.level, "debug");
        assert_eq!(app.engine.catalog().map_groups().len(), 1);
        assert_eq!(app.engine.state().current_map_group().name(), "mg_active");
        assert!(format!("{app:?}").contains("RotationEngine"));
    }

    #[tokio::test]
    async fn test_game_dir_override_and_missing_catalog() {
        let dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.settings.enabled = false;

        let mut cli = args(None);
        cli.game_dir = Some(dir.path().to_path_buf());
        let err = Application::new(cli, config).await.unwrap_err();
        assert!(err.to_string().contains("map group file"));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let mut config = AppConfig::default();
        config.game_mode.interval = 0;

        let err = Application::new(args(None), config).await.unwrap_err();
        assert!(err.to_string().contains("Configuration validation failed"));
    }
}
