//! Mutable rotation state for one server session.
//!
//! The engine owns the only `RotationState`; other components get read-only
//! views through [`RotationState::snapshot`] or the engine's accessors.

use crate::catalog::{GameMode, Map, MapGroup};
use crate::error::{Result, RotationError};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct RotationState {
    current_map: Option<Map>,
    current_map_group: MapGroup,
    current_mode: Option<GameMode>,
    rotation_counter: u64,
}

/// Serializable copy of the state, used for status output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RotationSnapshot {
    pub current_map: Option<Map>,
    pub current_map_group: String,
    pub current_mode: Option<String>,
    pub rotation_counter: u64,
}

impl RotationState {
    /// Creates the initial state on the given (default) map group.
    pub fn new(initial_group: MapGroup) -> Self {
        Self {
            current_map: None,
            current_map_group: initial_group,
            current_mode: None,
            rotation_counter: 0,
        }
    }

    /// Returns `(map, map group, counter)`.
    pub fn current(&self) -> (Option<&Map>, &MapGroup, u64) {
        (
            self.current_map.as_ref(),
            &self.current_map_group,
            self.rotation_counter,
        )
    }

    pub fn current_map(&self) -> Option<&Map> {
        self.current_map.as_ref()
    }

    pub fn current_map_group(&self) -> &MapGroup {
        &self.current_map_group
    }

    pub fn current_mode(&self) -> Option<&GameMode> {
        self.current_mode.as_ref()
    }

    pub fn rotation_counter(&self) -> u64 {
        self.rotation_counter
    }

    pub fn set_current_map(&mut self, map: Map) -> Result<()> {
        if map.name().trim().is_empty() {
            return Err(RotationError::InvalidStateTransition(
                "refusing to adopt a map with an empty name".to_string(),
            ));
        }
        self.current_map = Some(map);
        Ok(())
    }

    pub fn set_current_map_group(&mut self, group: MapGroup) -> Result<()> {
        if group.maps().is_empty() {
            return Err(RotationError::InvalidStateTransition(format!(
                "refusing to adopt empty map group '{}'",
                group.name()
            )));
        }
        self.current_map_group = group;
        Ok(())
    }

    pub fn set_current_mode(&mut self, mode: GameMode) -> Result<()> {
        if mode.name().is_empty() {
            return Err(RotationError::InvalidStateTransition(
                "refusing to adopt a game mode with an empty name".to_string(),
            ));
        }
        self.current_mode = Some(mode);
        Ok(())
    }

    /// Bumps the rotation counter, returning the value before the bump.
    pub fn increment_counter(&mut self) -> u64 {
        let previous = self.rotation_counter;
        self.rotation_counter = self.rotation_counter.wrapping_add(1);
        previous
    }

    pub fn snapshot(&self) -> RotationSnapshot {
        RotationSnapshot {
            current_map: self.current_map.clone(),
            current_map_group: self.current_map_group.name().to_string(),
            current_mode: self.current_mode.as_ref().map(|m| m.name().to_string()),
            rotation_counter: self.rotation_counter,
        }
    }
}
