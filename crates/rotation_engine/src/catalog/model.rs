//! Catalog entities: maps, map groups, game modes and settings.

use crate::error::{Result, RotationError};
use serde::Serialize;
use std::fmt;

/// A playable map, either installed locally or fetched from the workshop.
///
/// Equality is value equality on `(name, workshop_id)`. An empty
/// `workshop_id` means the map has no workshop id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Map {
    name: String,
    workshop_id: String,
}

impl Map {
    /// Creates a map. Fails if `name` is empty.
    pub fn new(name: impl Into<String>, workshop_id: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RotationError::Catalog("map name cannot be empty".to_string()));
        }
        Ok(Self {
            name,
            workshop_id: workshop_id.into(),
        })
    }

    /// Creates a local map with no workshop id.
    pub fn local(name: impl Into<String>) -> Result<Self> {
        Self::new(name, "")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn workshop_id(&self) -> Option<&str> {
        if self.workshop_id.is_empty() {
            None
        } else {
            Some(&self.workshop_id)
        }
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.workshop_id() {
            Some(id) => write!(f, "{} ({})", self.name, id),
            None => f.write_str(&self.name),
        }
    }
}

/// A named, ordered collection of maps that rotate together.
///
/// A group always holds at least one map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapGroup {
    name: String,
    maps: Vec<Map>,
}

impl MapGroup {
    /// Creates a map group. Fails if the name is empty or there are no maps.
    pub fn new(name: impl Into<String>, maps: Vec<Map>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RotationError::Catalog("map group name cannot be empty".to_string()));
        }
        if maps.is_empty() {
            return Err(RotationError::Catalog(format!("map group '{name}' has no maps")));
        }
        Ok(Self { name, maps })
    }

    /// Builds a group without checks, for exercising empty-group handling.
    #[cfg(test)]
    pub(crate) fn unchecked(name: &str, maps: Vec<Map>) -> Self {
        Self {
            name: name.to_string(),
            maps,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn maps(&self) -> &[Map] {
        &self.maps
    }

    pub fn contains(&self, map: &Map) -> bool {
        self.maps.contains(map)
    }

    /// Finds a map in this group by exact name.
    pub fn find_map(&self, name: &str) -> Option<&Map> {
        self.maps.iter().find(|m| m.name() == name)
    }
}

/// A named configuration profile, applied by executing `<name>.cfg`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GameMode {
    name: String,
}

impl GameMode {
    /// Creates a game mode. The name has to be usable as an exec target.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(RotationError::Config("game mode name cannot be empty".to_string()));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(RotationError::Config(format!(
                "game mode name '{name}' cannot contain whitespace"
            )));
        }
        Ok(Self { name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The config file executed to apply this mode.
    pub fn config_file(&self) -> String {
        format!("{}.cfg", self.name)
    }

    /// Host command that applies the mode.
    pub fn exec_command(&self) -> String {
        format!("exec {}", self.config_file())
    }
}

/// A named toggle exposed to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Setting {
    pub name: String,
    pub enable_action: String,
    pub disable_action: String,
}

impl Setting {
    /// Returns the host command for the requested direction.
    pub fn action(&self, enable: bool) -> &str {
        if enable {
            &self.enable_action
        } else {
            &self.disable_action
        }
    }
}
