//! Engine configuration types and defaults.
//!
//! This module contains the resolved configuration the rotation engine runs
//! with. Paths in here are absolute (or at least already checked to exist);
//! turning a user-facing configuration file into a `RotationConfig` is the
//! job of the application shell.

use std::path::PathBuf;
use std::time::Duration;

/// Format used for workshop maps in the vote plugin's list file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapListFormat {
    /// `<map name>:<workshop id>`
    NameAndId,
    /// `ws:<workshop id>`
    IdOnly,
}

impl MapListFormat {
    /// Maps the configuration's `default_map_format` flag onto a format.
    pub fn from_id_only_flag(id_only: bool) -> Self {
        if id_only {
            MapListFormat::IdOnly
        } else {
            MapListFormat::NameAndId
        }
    }
}

/// Compatibility settings for an external rock-the-vote plugin.
#[derive(Debug, Clone)]
pub struct RtvConfig {
    /// When enabled the external plugin owns map choice at match end
    pub enabled: bool,
    /// Path of the plugin, used in the reload command
    pub plugin: PathBuf,
    /// List file the plugin reads
    pub map_list_file: PathBuf,
    pub format: MapListFormat,
}

/// Game-mode rotation settings.
#[derive(Debug, Clone)]
pub struct GameModeRotationConfig {
    pub enabled: bool,
    /// A mode change happens on every match end where `counter % interval == 0`
    pub interval: u64,
    /// Grace period before the mode is executed
    pub delay: Duration,
}

/// Vote integration flags.
#[derive(Debug, Clone, Default)]
pub struct VoteConfig {
    pub enabled: bool,
    pub game_mode: bool,
    pub game_setting: bool,
}

/// Configuration structure for the rotation engine.
#[derive(Debug, Clone)]
pub struct RotationConfig {
    /// Name of the map group used at start-up and as fallback
    pub default_map_group: String,

    /// Grace period before a level change is issued
    pub map_change_delay: Duration,

    pub rtv: RtvConfig,

    pub game_mode: GameModeRotationConfig,

    pub votes: VoteConfig,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            default_map_group: "mg_active".to_string(),
            map_change_delay: Duration::from_secs(5),
            rtv: RtvConfig {
                enabled: false,
                plugin: PathBuf::from("addons/counterstrikesharp/plugins/RockTheVote/RockTheVote.dll"),
                map_list_file: PathBuf::from("addons/counterstrikesharp/plugins/RockTheVote/maplist.txt"),
                format: MapListFormat::NameAndId,
            },
            game_mode: GameModeRotationConfig {
                enabled: true,
                interval: 4,
                delay: Duration::from_secs(5),
            },
            votes: VoteConfig::default(),
        }
    }
}
