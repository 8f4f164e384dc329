//! Command-line interface handling for the rotation server.
//!
//! Values given on the command line override the configuration file.

use clap::{value_parser, Arg, Command};
use std::path::PathBuf;

/// Command line arguments parsed from user input.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for the game directory
    pub game_dir: Option<PathBuf>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// Seed for the selection generator; random when absent
    pub seed: Option<u64>,
}

impl CliArgs {
    /// Parses command line arguments using clap.
    ///
    /// # Returns
    ///
    /// A `CliArgs` with the config path defaulted to `config.toml` and every
    /// other override left unset unless given.
    ///
    /// # Exits
    ///
    /// On invalid input clap prints the usage error and exits
    /// the process, as it does for `--help` and `--version`.
    pub fn parse() -> Self {
        Self::from_matches(command().get_matches())
    }

    fn from_matches(matches: clap::ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("config.toml")),
            game_dir: matches.get_one::<String>("game-dir").map(PathBuf::from),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            seed: matches.get_one::<u64>("seed").copied(),
        }
    }
}

fn command() -> Command {
    Command::new("Rotation Server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Map and game mode rotation for dedicated game servers")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("game-dir")
                .short('g')
                .long("game-dir")
                .value_name("DIR")
                .help("Game directory holding maps/ and cfg/"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .help("Output logs in JSON format")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("SEED")
                .help("Seed the map and mode selection for reproducible rotations")
                .value_parser(value_parser!(u64)),
        )
}
