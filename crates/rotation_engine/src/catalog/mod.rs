//! # Catalog Model
//!
//! Immutable-after-load description of everything the rotation can choose
//! from: map groups (from the KeyValues catalog file), game modes (from the
//! configured list or derived from the group names) and settings (from the
//! settings folder).
//!
//! All name lookups are case-sensitive exact matches.

mod keyvalues;
mod model;

pub use keyvalues::{find_child, parse as parse_keyvalues, KvPair, KvValue};
pub use model::{GameMode, Map, MapGroup, Setting};

use crate::error::{Result, RotationError};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where the catalog is read from.
#[derive(Debug, Clone)]
pub struct CatalogSources {
    /// KeyValues file holding the `mapgroups` section
    pub map_group_file: PathBuf,
    /// Name of the group used at start-up and as fallback
    pub default_map_group: String,
    /// Operator-supplied game mode list
    pub game_mode_list: Vec<String>,
    /// When false, game modes are derived from the map group names
    pub game_mode_list_enabled: bool,
    /// Settings folder on disk, `None` when game settings are disabled
    pub settings_dir: Option<PathBuf>,
    /// Folder name used inside setting exec commands
    pub settings_folder: String,
}

/// Everything the rotation can pick from, loaded once per session.
#[derive(Debug, Clone)]
pub struct Catalog {
    map_groups: Vec<MapGroup>,
    game_modes: Vec<GameMode>,
    settings: Vec<Setting>,
    default_group: usize,
    /// First map of the default group
    default_map: Map,
    /// First game mode in catalog order
    fallback_mode: GameMode,
}

impl Catalog {
    /// Builds a catalog, checking the cross-entity invariants.
    ///
    /// Group names, mode names and setting names must be unique, every group
    /// must hold at least one map, there must be at least one game mode, and
    /// `default_map_group` must name a group.
    pub fn new(
        map_groups: Vec<MapGroup>,
        game_modes: Vec<GameMode>,
        settings: Vec<Setting>,
        default_map_group: &str,
    ) -> Result<Self> {
        if default_map_group.trim().is_empty() {
            return Err(RotationError::Config(
                "Default map group can not be empty".to_string(),
            ));
        }

        ensure_unique(map_groups.iter().map(MapGroup::name), "map group")?;
        ensure_unique(game_modes.iter().map(GameMode::name), "game mode")?;
        ensure_unique(settings.iter().map(|s| s.name.as_str()), "setting")?;

        if let Some(empty) = map_groups.iter().find(|g| g.maps().is_empty()) {
            return Err(RotationError::Catalog(format!(
                "map group '{}' has no maps",
                empty.name()
            )));
        }

        let fallback_mode = game_modes
            .first()
            .cloned()
            .ok_or_else(|| RotationError::Config("Game mode list cannot be empty".to_string()))?;

        let default_group = map_groups
            .iter()
            .position(|g| g.name() == default_map_group)
            .ok_or_else(|| {
                RotationError::Catalog(format!(
                    "default map group '{default_map_group}' not found in catalog"
                ))
            })?;

        let default_map = map_groups[default_group]
            .maps()
            .first()
            .cloned()
            .ok_or_else(|| RotationError::EmptyGroup(default_map_group.to_string()))?;

        Ok(Self {
            map_groups,
            game_modes,
            settings,
            default_group,
            default_map,
            fallback_mode,
        })
    }

    /// Loads the complete catalog from its sources.
    pub fn load(sources: &CatalogSources) -> Result<Self> {
        let map_groups = load_map_groups(&sources.map_group_file)?;
        let game_modes = load_game_modes(
            &sources.game_mode_list,
            sources.game_mode_list_enabled,
            &map_groups,
        )?;
        let settings = match &sources.settings_dir {
            Some(dir) => load_settings(dir, &sources.settings_folder)?,
            None => Vec::new(),
        };

        let catalog = Self::new(map_groups, game_modes, settings, &sources.default_map_group)?;
        info!(
            "📚 Catalog loaded: {} map groups, {} game modes, {} settings",
            catalog.map_groups.len(),
            catalog.game_modes.len(),
            catalog.settings.len()
        );
        Ok(catalog)
    }

    pub fn map_groups(&self) -> &[MapGroup] {
        &self.map_groups
    }

    pub fn game_modes(&self) -> &[GameMode] {
        &self.game_modes
    }

    pub fn settings(&self) -> &[Setting] {
        &self.settings
    }

    pub fn default_map_group(&self) -> &MapGroup {
        &self.map_groups[self.default_group]
    }

    /// Fallback for unknown map overrides.
    pub fn default_map(&self) -> &Map {
        &self.default_map
    }

    /// Fallback for unknown game mode overrides.
    pub fn fallback_game_mode(&self) -> &GameMode {
        &self.fallback_mode
    }

    pub fn map_group(&self, name: &str) -> Option<&MapGroup> {
        self.map_groups.iter().find(|g| g.name() == name)
    }

    /// Finds a map by name across all groups, first match in catalog order.
    pub fn find_map(&self, name: &str) -> Option<&Map> {
        self.map_groups.iter().find_map(|g| g.find_map(name))
    }

    pub fn game_mode(&self, name: &str) -> Option<&GameMode> {
        self.game_modes.iter().find(|m| m.name() == name)
    }

    pub fn setting(&self, name: &str) -> Option<&Setting> {
        self.settings.iter().find(|s| s.name == name)
    }
}

fn ensure_unique<'a>(names: impl Iterator<Item = &'a str>, kind: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(RotationError::Catalog(format!("duplicate {kind} name '{name}'")));
        }
    }
    Ok(())
}

/// Reads map groups from a KeyValues catalog file.
pub fn load_map_groups(path: &Path) -> Result<Vec<MapGroup>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        RotationError::Catalog(format!("Cannot read map group file {}: {e}", path.display()))
    })?;
    parse_map_groups(&content)
        .map_err(|e| RotationError::Catalog(format!("{}: {e}", path.display())))
}

/// Parses the `mapgroups` section of a KeyValues catalog.
pub fn parse_map_groups(content: &str) -> Result<Vec<MapGroup>> {
    let pairs = keyvalues::parse(content)?;

    let section = find_child(&pairs, "mapgroups")
        .or_else(|| {
            pairs
                .iter()
                .filter_map(KvPair::as_block)
                .find_map(|root| find_child(root, "mapgroups"))
        })
        .ok_or_else(|| RotationError::Catalog("no 'mapgroups' section".to_string()))?;

    let entries = section.as_block().ok_or_else(|| {
        RotationError::Catalog(format!("line {}: 'mapgroups' must be a block", section.line))
    })?;

    let mut groups = Vec::with_capacity(entries.len());
    for entry in entries {
        let body = entry.as_block().ok_or_else(|| {
            RotationError::Catalog(format!("line {}: map group '{}' must be a block", entry.line, entry.key))
        })?;
        let maps = find_child(body, "maps")
            .and_then(KvPair::as_block)
            .ok_or_else(|| {
                RotationError::Catalog(format!(
                    "line {}: map group '{}' has no 'maps' block",
                    entry.line, entry.key
                ))
            })?;

        let maps = maps
            .iter()
            .map(|m| parse_map_key(&m.key, m.line))
            .collect::<Result<Vec<_>>>()?;

        let group = MapGroup::new(entry.key.clone(), maps).map_err(|e| {
            RotationError::Catalog(format!("line {}: {}", entry.line, strip_prefix(&e)))
        })?;
        debug!("Loaded map group '{}' with {} maps", group.name(), group.maps().len());
        groups.push(group);
    }

    if groups.is_empty() {
        return Err(RotationError::Catalog("'mapgroups' section is empty".to_string()));
    }
    ensure_unique(groups.iter().map(MapGroup::name), "map group")?;
    Ok(groups)
}

/// Parses a map entry key: `<name>`, `workshop/<id>` or `workshop/<id>/<name>`.
fn parse_map_key(key: &str, line: usize) -> Result<Map> {
    let malformed = || RotationError::Catalog(format!("line {line}: malformed map entry '{key}'"));

    let Some(rest) = key.strip_prefix("workshop/") else {
        return Map::local(key).map_err(|_| malformed());
    };

    let mut parts = rest.splitn(2, '/');
    let id = parts.next().unwrap_or_default();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(malformed());
    }
    let name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        Some(_) => return Err(malformed()),
        // Workshop-only entries display their id
        None => id,
    };
    Map::new(name, id).map_err(|_| malformed())
}

fn strip_prefix(err: &RotationError) -> String {
    match err {
        RotationError::Catalog(msg) | RotationError::Config(msg) => msg.clone(),
        other => other.to_string(),
    }
}

/// Builds the game mode catalog.
///
/// With the custom list enabled the list is used as-is and must not be
/// empty. Otherwise one mode is derived per distinct map group name.
pub fn load_game_modes(
    list: &[String],
    list_enabled: bool,
    groups: &[MapGroup],
) -> Result<Vec<GameMode>> {
    if list_enabled {
        if list.is_empty() {
            return Err(RotationError::Config("Game mode list cannot be empty".to_string()));
        }
        let modes = list
            .iter()
            .map(|name| GameMode::new(name.as_str()))
            .collect::<Result<Vec<_>>>()?;
        ensure_unique(modes.iter().map(GameMode::name), "game mode")
            .map_err(|e| RotationError::Config(strip_prefix(&e)))?;
        return Ok(modes);
    }

    let mut seen = HashSet::new();
    let mut modes = Vec::new();
    for group in groups {
        if seen.insert(group.name()) {
            let mode = GameMode::new(group.name()).map_err(|e| {
                RotationError::Catalog(format!("cannot derive game mode: {}", strip_prefix(&e)))
            })?;
            modes.push(mode);
        }
    }
    if modes.is_empty() {
        return Err(RotationError::Catalog(
            "cannot derive game modes from an empty map group catalog".to_string(),
        ));
    }
    Ok(modes)
}

/// Discovers settings from `enable_<name>.cfg` / `disable_<name>.cfg` pairs.
///
/// Settings missing one half are skipped. The result is sorted by name.
pub fn load_settings(dir: &Path, folder: &str) -> Result<Vec<Setting>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        RotationError::Catalog(format!("Cannot read settings folder {}: {e}", dir.display()))
    })?;

    let mut halves: BTreeMap<String, (Option<String>, Option<String>)> = BTreeMap::new();
    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let Some(stem) = file_name.strip_suffix(".cfg") else {
            continue;
        };
        if let Some(name) = stem.strip_prefix("enable_") {
            halves.entry(name.to_string()).or_default().0 = Some(file_name.clone());
        } else if let Some(name) = stem.strip_prefix("disable_") {
            halves.entry(name.to_string()).or_default().1 = Some(file_name.clone());
        }
    }

    let folder = folder.trim_matches('/');
    let mut settings = Vec::new();
    for (name, pair) in halves {
        match pair {
            (Some(enable), Some(disable)) if !name.is_empty() => settings.push(Setting {
                name,
                enable_action: format!("exec {folder}/{enable}"),
                disable_action: format!("exec {folder}/{disable}"),
            }),
            _ => warn!("⚠️ Skipping setting '{}': needs both enable_ and disable_ files", name),
        }
    }
    Ok(settings)
}
