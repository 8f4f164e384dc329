//! Configuration management for the rotation server.
//!
//! This module handles loading, validation, and conversion of the rotation
//! configuration from TOML files and command-line arguments.

use rotation_engine::{
    CatalogSources, GameModeRotationConfig, MapListFormat, RotationConfig, RotationError, RtvConfig,
    VoteConfig,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Oldest configuration layout this build understands.
pub const MIN_CONFIG_VERSION: u32 = 2;

/// Layout written into freshly generated files.
pub const CURRENT_CONFIG_VERSION: u32 = 2;

fn default_version() -> u32 {
    0
}

fn default_delay() -> f64 {
    5.0
}

fn default_interval() -> u64 {
    4
}

fn default_game_mode_list() -> Vec<String> {
    [
        "comp",
        "1v1",
        "aim",
        "awp",
        "scoutzknivez",
        "wingman",
        "gungame",
        "surf",
        "dm",
        "dm-multicfg",
        "course",
        "hns",
        "kz",
        "minigames",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Application configuration loaded from TOML file.
///
/// Relative paths are resolved against `server.game_directory`, except the
/// settings folder which lives under `server.config_directory`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Layout version of the file
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Rock-the-vote plugin compatibility
    #[serde(default)]
    pub rtv: RtvSettings,
    #[serde(default)]
    pub map_group: MapGroupSettings,
    #[serde(default)]
    pub settings: GameSettings,
    #[serde(default)]
    pub game_mode: GameModeSettings,
    #[serde(default)]
    pub votes: VoteSettings,
}

/// Where the game server keeps its content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Game content directory (the one holding `maps/` and `cfg/`)
    pub game_directory: String,
    /// Server config directory, relative to the game directory
    pub config_directory: String,
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    pub json_format: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RtvSettings {
    pub enabled: bool,
    /// Plugin path, used in the reload command
    pub plugin: String,
    /// Map list file the plugin reads
    pub map_list_file: String,
    /// `true` writes workshop maps as `ws:<id>`, `false` as `<name>:<id>`
    pub default_map_format: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapGroupSettings {
    /// Map change delay in seconds
    pub delay: f64,
    /// Map group used on start-up and as fallback
    pub default: String,
    /// KeyValues file holding the map groups
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub enabled: bool,
    /// Settings folder, relative to the config directory
    pub folder: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameModeSettings {
    /// Enables game mode rotation
    pub rotation: bool,
    /// Changes game mode every `interval` map rotations
    pub interval: u64,
    /// Game mode change delay in seconds
    pub delay: f64,
    /// Use `list`; when false the modes are derived from the map groups
    pub list_enabled: bool,
    pub list: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VoteSettings {
    pub enabled: bool,
    pub game_mode: bool,
    pub game_setting: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            game_directory: ".".to_string(),
            config_directory: "cfg".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for RtvSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            plugin: "addons/counterstrikesharp/plugins/RockTheVote/RockTheVote.dll".to_string(),
            map_list_file: "addons/counterstrikesharp/plugins/RockTheVote/maplist.txt".to_string(),
            default_map_format: false,
        }
    }
}

impl Default for MapGroupSettings {
    fn default() -> Self {
        Self {
            delay: default_delay(),
            default: "mg_active".to_string(),
            file: "gamemodes_server.txt".to_string(),
        }
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            folder: "settings".to_string(),
        }
    }
}

impl Default for GameModeSettings {
    fn default() -> Self {
        Self {
            rotation: true,
            interval: default_interval(),
            delay: default_delay(),
            list_enabled: true,
            list: default_game_mode_list(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            server: ServerSettings::default(),
            logging: LoggingSettings::default(),
            rtv: RtvSettings::default(),
            map_group: MapGroupSettings::default(),
            settings: GameSettings::default(),
            game_mode: GameModeSettings::default(),
            votes: VoteSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, creates a default configuration file at the
    /// specified path and returns the default configuration. The layout
    /// version is checked before any other field is interpreted.
    pub async fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            Ok(Self::from_toml_str(&content)?)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("📝 Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Parses a configuration document, rejecting outdated layouts first.
    pub fn from_toml_str(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let table: toml::Table = content.parse()?;

        let version = table
            .get("version")
            .and_then(toml::Value::as_integer)
            .unwrap_or(0);
        if version < i64::from(MIN_CONFIG_VERSION) {
            return Err(RotationError::Config(format!(
                "configuration version {version} is no longer supported (minimum {MIN_CONFIG_VERSION}); \
                 delete the file and restart to regenerate it"
            ))
            .into());
        }

        Ok(toml::Value::Table(table).try_into()?)
    }

    /// Validates the configuration for consistency and correctness.
    ///
    /// Only value checks happen here; paths are checked when converting to
    /// the engine configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.version < MIN_CONFIG_VERSION {
            return Err(format!(
                "Configuration version {} is below the minimum {MIN_CONFIG_VERSION}",
                self.version
            ));
        }

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        if !self.map_group.delay.is_finite() || self.map_group.delay < 0.0 {
            return Err(format!(
                "Map group delay must be a non-negative number, got {}",
                self.map_group.delay
            ));
        }
        if self.map_group.default.trim().is_empty() {
            return Err("Default map group can not be empty".to_string());
        }
        if self.map_group.file.trim().is_empty() {
            return Err("Map group file can not be empty".to_string());
        }

        if !self.game_mode.delay.is_finite() || self.game_mode.delay < 0.0 {
            return Err(format!(
                "Game mode delay must be a non-negative number, got {}",
                self.game_mode.delay
            ));
        }
        if self.game_mode.interval < 1 {
            return Err("Game mode interval must be at least 1".to_string());
        }
        if self.game_mode.list_enabled && self.game_mode.list.is_empty() {
            return Err("Game mode list is enabled but empty".to_string());
        }

        if self.settings.enabled && self.settings.folder.trim().is_empty() {
            return Err("Settings folder can not be empty".to_string());
        }

        Ok(())
    }

    pub fn game_directory(&self) -> PathBuf {
        PathBuf::from(&self.server.game_directory)
    }

    pub fn config_directory(&self) -> PathBuf {
        self.resolve(&self.server.config_directory)
    }

    /// Resolves `path` against the game directory unless it is absolute.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.game_directory().join(path)
        }
    }

    /// Converts the file configuration into the engine's runtime configuration.
    ///
    /// Fails when RTV compatibility is on and its plugin or list file is missing.
    pub fn to_rotation_config(&self) -> Result<RotationConfig, RotationError> {
        let rtv = if self.rtv.enabled {
            RtvConfig {
                enabled: true,
                plugin: existing_file(self.resolve(&self.rtv.plugin), "RTV plugin")?,
                map_list_file: existing_file(self.resolve(&self.rtv.map_list_file), "RTV map list file")?,
                format: MapListFormat::from_id_only_flag(self.rtv.default_map_format),
            }
        } else {
            RtvConfig {
                enabled: false,
                plugin: PathBuf::from(&self.rtv.plugin),
                map_list_file: PathBuf::from(&self.rtv.map_list_file),
                format: MapListFormat::from_id_only_flag(self.rtv.default_map_format),
            }
        };

        Ok(RotationConfig {
            default_map_group: self.map_group.default.clone(),
            map_change_delay: seconds(self.map_group.delay, "map group delay")?,
            rtv,
            game_mode: GameModeRotationConfig {
                enabled: self.game_mode.rotation,
                interval: self.game_mode.interval,
                delay: seconds(self.game_mode.delay, "game mode delay")?,
            },
            votes: VoteConfig {
                enabled: self.votes.enabled,
                game_mode: self.votes.game_mode,
                game_setting: self.votes.game_setting,
            },
        })
    }

    /// Describes where the catalog is loaded from.
    ///
    /// Fails when the map group file or an enabled settings folder is missing.
    pub fn to_catalog_sources(&self) -> Result<CatalogSources, RotationError> {
        let map_group_file = existing_file(self.resolve(&self.map_group.file), "map group file")?;

        let settings_dir = if self.settings.enabled {
            let dir = self.config_directory().join(&self.settings.folder);
            if !dir.is_dir() {
                return Err(RotationError::Config(format!(
                    "Cannot find settings folder: {}",
                    dir.display()
                )));
            }
            Some(dir)
        } else {
            None
        };

        Ok(CatalogSources {
            map_group_file,
            default_map_group: self.map_group.default.clone(),
            game_mode_list: self.game_mode.list.clone(),
            game_mode_list_enabled: self.game_mode.list_enabled,
            settings_dir,
            settings_folder: self.settings.folder.clone(),
        })
    }
}

fn existing_file(path: PathBuf, what: &str) -> Result<PathBuf, RotationError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(RotationError::Config(format!("Cannot find {what}: {}", path.display())))
    }
}

fn seconds(value: f64, what: &str) -> Result<Duration, RotationError> {
    Duration::try_from_secs_f64(value)
        .map_err(|e| RotationError::Config(format!("Invalid {what} {value}: {e}")))
}
