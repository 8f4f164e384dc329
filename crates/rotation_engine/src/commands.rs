//! Operator command surface.
//!
//! Commands are parsed from console text and dispatched to exactly one
//! engine entry point each. They never touch rotation state themselves.
//! Both the long names (`change-map`) and the classic console aliases
//! (`css_map`) are accepted.

use crate::engine::RotationEngine;
use crate::error::RotationError;
use rand::Rng;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetMapGroup { group: String },
    ListMaps,
    ChangeMap { map: String, workshop_id: Option<String> },
    ChangeMode { mode: String },
    ListModes,
    ToggleSetting { enable: bool, setting: String },
    ListSettings,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Unexpected argument: {0}")]
    InvalidArgument(String),
}

impl Command {
    pub fn usage(name: &str) -> Option<&'static str> {
        let usage = match name {
            "set-map-group" | "css_mapgroup" => "set-map-group <group>",
            "list-maps" | "css_maps" => "list-maps",
            "change-map" | "css_map" => "change-map <map> [workshop id]",
            "change-mode" | "css_mode" => "change-mode <mode>",
            "list-modes" | "css_modes" => "list-modes",
            "toggle-setting" | "css_setting" => "toggle-setting <enable|disable> <setting>",
            "list-settings" | "css_settings" => "list-settings",
            _ => return None,
        };
        Some(usage)
    }
}

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(CommandParseError::Empty)?.to_ascii_lowercase();
        let args: Vec<&str> = words.collect();

        let usage = Command::usage(&name).ok_or_else(|| CommandParseError::Unknown(name.clone()))?;
        let arg = |i: usize| args.get(i).map(|s| s.to_string()).ok_or(CommandParseError::Usage(usage));

        let command = match name.as_str() {
            "set-map-group" | "css_mapgroup" => Command::SetMapGroup { group: arg(0)? },
            "list-maps" | "css_maps" => Command::ListMaps,
            "change-map" | "css_map" => Command::ChangeMap {
                map: arg(0)?,
                workshop_id: args.get(1).map(|s| s.to_string()),
            },
            "change-mode" | "css_mode" => Command::ChangeMode { mode: arg(0)? },
            "list-modes" | "css_modes" => Command::ListModes,
            "toggle-setting" | "css_setting" => {
                let action = arg(0)?;
                let setting = arg(1)?;
                let enable = match action.to_ascii_lowercase().as_str() {
                    "enable" => true,
                    "disable" => false,
                    _ => return Err(CommandParseError::InvalidArgument(action)),
                };
                Command::ToggleSetting { enable, setting }
            }
            "list-settings" | "css_settings" => Command::ListSettings,
            _ => return Err(CommandParseError::Unknown(name)),
        };
        Ok(command)
    }
}

/// Parses a console line into a command.
pub fn parse_command(line: &str) -> Result<Command, CommandParseError> {
    line.parse()
}

/// Text returned to the operator who issued a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub success: bool,
    pub lines: Vec<String>,
}

impl CommandReply {
    fn ok(lines: Vec<String>) -> Self {
        Self { success: true, lines }
    }

    fn error(line: String) -> Self {
        Self {
            success: false,
            lines: vec![line],
        }
    }
}

/// Runs `command` against the engine on behalf of `actor`.
pub fn dispatch<R: Rng>(engine: &mut RotationEngine<R>, actor: &str, command: Command) -> CommandReply {
    match command {
        Command::SetMapGroup { group } => {
            let result = engine.set_map_group(&group);
            if result.fell_back {
                CommandReply::ok(vec![format!(
                    "Map group '{group}' not found, using default map group '{}'",
                    result.target
                )])
            } else {
                CommandReply::ok(vec![format!("Map group set to '{}'", result.target)])
            }
        }
        Command::ListMaps => {
            let group = engine.state().current_map_group();
            let mut lines = vec![format!("Maps in '{}':", group.name())];
            lines.extend(group.maps().iter().map(|m| format!("  {m}")));
            CommandReply::ok(lines)
        }
        Command::ChangeMap { map, workshop_id } => {
            let result = engine.change_map(actor, &map, workshop_id.as_deref());
            let mut lines = Vec::new();
            if result.fell_back {
                lines.push(format!("Map '{map}' not found, using default map"));
            }
            lines.push(format!("Changing map to {}", result.target));
            CommandReply::ok(lines)
        }
        Command::ChangeMode { mode } => {
            let result = engine.change_mode(actor, &mode);
            let mut lines = Vec::new();
            if result.fell_back {
                lines.push(format!("Game mode '{mode}' not found, using default game mode"));
            }
            lines.push(format!("Changing game mode to {}", result.target.name()));
            CommandReply::ok(lines)
        }
        Command::ListModes => {
            let mut lines = vec!["Game modes:".to_string()];
            lines.extend(engine.catalog().game_modes().iter().map(|m| format!("  {}", m.name())));
            CommandReply::ok(lines)
        }
        Command::ToggleSetting { enable, setting } => {
            match engine.toggle_setting(actor, &setting, enable) {
                Ok(found) => {
                    let verb = if enable { "Enabled" } else { "Disabled" };
                    CommandReply::ok(vec![format!("{verb} setting {}", found.name)])
                }
                Err(RotationError::NotFound(_)) => {
                    CommandReply::error(format!("Can't find setting: {setting}"))
                }
                Err(e) => CommandReply::error(e.to_string()),
            }
        }
        Command::ListSettings => {
            let settings = engine.catalog().settings();
            if settings.is_empty() {
                return CommandReply::ok(vec!["No game settings available".to_string()]);
            }
            let mut lines = vec!["Game settings:".to_string()];
            lines.extend(settings.iter().map(|s| format!("  {}", s.name)));
            CommandReply::ok(lines)
        }
    }
}
