//! # Rotation Engine
//!
//! The state machine that decides what happens at match end and applies
//! operator overrides.
//!
//! ```text
//!            match end                 schedule
//!   Idle ───────────────▶ Deciding ───────────────▶ Applying
//!    ▲                       │                         │
//!    │   RTV / selection err │        fire(gen)        │
//!    └───────────────────────┴─────────────────────────┘
//! ```
//!
//! Overrides skip `Deciding`. Every scheduled change gets a fresh generation
//! number; a due callback carrying an older generation is ignored, so a later
//! decision always supersedes an earlier one that has not fired yet.
//!
//! The engine is not thread-safe by intent: all entry points must be called
//! from the single control thread that owns it.

use crate::catalog::{Catalog, GameMode, Map, MapGroup, Setting};
use crate::config::RotationConfig;
use crate::error::{Result, RotationError};
use crate::host::{ApplyScheduler, GameHost, LevelChange};
use crate::selection::{is_mode_change_due, pick_next_game_mode, pick_next_map};
use crate::state::{RotationSnapshot, RotationState};
use crate::sync::MapListSync;
use crate::votes::build_votes;
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Engine lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnginePhase {
    /// Between matches, nothing scheduled
    Idle,
    /// Match end received, policy being evaluated
    Deciding,
    /// A change is scheduled and waiting for its grace period
    Applying,
}

/// A change waiting for its grace period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingChange {
    Map(Map),
    Mode(GameMode),
}

#[derive(Debug, Clone)]
struct Pending {
    generation: u64,
    change: PendingChange,
}

/// What a match end resulted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEndOutcome {
    /// RTV compatibility is on; the external plugin picks the map
    Delegated,
    Scheduled(PendingChange),
    /// Selection failed; state was preserved
    Aborted,
}

/// Result of an override whose target may have been replaced by a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override<T> {
    pub target: T,
    pub fell_back: bool,
}

pub struct RotationEngine<R> {
    config: RotationConfig,
    catalog: Arc<Catalog>,
    state: RotationState,
    host: Arc<dyn GameHost>,
    scheduler: Arc<dyn ApplyScheduler>,
    sync: MapListSync,
    rng: R,
    phase: EnginePhase,
    pending: Option<Pending>,
    generation: u64,
}

impl<R> std::fmt::Debug for RotationEngine<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotationEngine")
            .field("phase", &self.phase)
            .field("state", &self.state)
            .field("generation", &self.generation)
            .finish()
    }
}

impl<R: Rng> RotationEngine<R> {
    /// Creates an engine positioned on the catalog's default map group.
    pub fn new(
        config: RotationConfig,
        catalog: Arc<Catalog>,
        host: Arc<dyn GameHost>,
        scheduler: Arc<dyn ApplyScheduler>,
        rng: R,
    ) -> Self {
        let state = RotationState::new(catalog.default_map_group().clone());
        let sync = MapListSync::new(config.rtv.clone());
        Self {
            config,
            catalog,
            state,
            host,
            scheduler,
            sync,
            rng,
            phase: EnginePhase::Idle,
            pending: None,
            generation: 0,
        }
    }

    /// Publishes the initial map list and registers votes.
    pub fn start(&mut self) {
        info!(
            "🎮 Rotation starting on map group '{}'",
            self.state.current_map_group().name()
        );
        self.sync_current_group();

        for vote in build_votes(&self.catalog, &self.config.votes) {
            info!("🗳️ Registering vote '{}' with {} options", vote.id, vote.options.len());
            self.host.register_vote(&vote);
        }
    }

    pub fn state(&self) -> &RotationState {
        &self.state
    }

    pub fn snapshot(&self) -> RotationSnapshot {
        self.state.snapshot()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// The change waiting for its grace period, if any.
    pub fn pending_change(&self) -> Option<&PendingChange> {
        self.pending.as_ref().map(|p| &p.change)
    }

    /// Records the map the host actually loaded.
    pub fn on_map_start(&mut self, map_name: &str) {
        let map = match self.catalog.find_map(map_name) {
            Some(map) => Ok(map.clone()),
            None => Map::local(map_name),
        };
        match map.and_then(|map| self.state.set_current_map(map)) {
            Ok(()) => info!("🗺️ Map started: {}", map_name),
            Err(e) => warn!("⚠️ Ignoring map start for '{}': {}", map_name, e),
        }
    }

    /// Handles the end of a match.
    ///
    /// The rotation counter is bumped exactly once per call, whichever
    /// branch is taken. The mode-change check uses the value before the bump.
    pub fn on_match_end(&mut self) -> MatchEndOutcome {
        self.phase = EnginePhase::Deciding;
        let counter = self.state.increment_counter();
        info!("🏁 Match ended (rotation #{})", counter);

        if self.config.rtv.enabled {
            debug!("RTV compatibility enabled, leaving map choice to the vote plugin");
            self.settle();
            return MatchEndOutcome::Delegated;
        }

        let mode_due = self.config.game_mode.enabled
            && is_mode_change_due(counter, self.config.game_mode.interval);

        let decision = if mode_due {
            pick_next_game_mode(&self.catalog, &mut self.rng).map(PendingChange::Mode)
        } else {
            pick_next_map(
                self.state.current_map_group(),
                self.state.current_map(),
                true,
                &mut self.rng,
            )
            .map(PendingChange::Map)
        };

        match decision {
            Ok(change) => {
                let message = match &change {
                    PendingChange::Map(map) => format!("Match over. Next map: {}", map.name()),
                    PendingChange::Mode(mode) => format!("Match over. Next game mode: {}", mode.name()),
                };
                self.host.print_to_chat_all(&message);
                self.schedule(change.clone());
                MatchEndOutcome::Scheduled(change)
            }
            Err(e) => {
                error!("❌ Rotation aborted, keeping current state: {}", e);
                self.settle();
                MatchEndOutcome::Aborted
            }
        }
    }

    /// Switches the active map group. Unknown names fall back to the default.
    ///
    /// The group takes effect immediately and the list file is rewritten; no
    /// level change is issued.
    pub fn set_map_group(&mut self, group_name: &str) -> Override<String> {
        let (group, fell_back) = match self.catalog.map_group(group_name) {
            Some(group) => (group.clone(), false),
            None => {
                warn!(
                    "⚠️ Map group '{}' not found, using default '{}'",
                    group_name,
                    self.catalog.default_map_group().name()
                );
                (self.catalog.default_map_group().clone(), true)
            }
        };

        info!(
            "🔀 Map group: '{}' -> '{}'",
            self.state.current_map_group().name(),
            group.name()
        );
        let target = group.name().to_string();
        self.adopt_group(group);
        Override { target, fell_back }
    }

    /// Overrides the next map.
    ///
    /// Maps known to the catalog or installed on the host are used as-is.
    /// An unknown map with a workshop id is treated as a workshop map;
    /// anything else falls back to the first map of the default group.
    pub fn change_map(&mut self, actor: &str, map_name: &str, workshop_id: Option<&str>) -> Override<Map> {
        let workshop_id = workshop_id.filter(|id| !id.is_empty());

        let resolved = if let Some(map) = self.catalog.find_map(map_name) {
            Some(map.clone())
        } else if let Some(id) = workshop_id {
            Map::new(map_name, id).ok()
        } else if self.host.is_map_valid(map_name) {
            Map::local(map_name).ok()
        } else {
            None
        };

        let (map, fell_back) = match resolved {
            Some(map) => (map, false),
            None => {
                let fallback = self.catalog.default_map().clone();
                warn!(
                    "⚠️ Map '{}' not found, falling back to '{}'",
                    map_name,
                    fallback.name()
                );
                (fallback, true)
            }
        };

        self.host
            .print_to_chat_all(&format!("{actor} changed the map to {}", map.name()));
        self.schedule(PendingChange::Map(map.clone()));
        Override { target: map, fell_back }
    }

    /// Overrides the game mode. Unknown modes fall back to the first mode.
    pub fn change_mode(&mut self, actor: &str, mode_name: &str) -> Override<GameMode> {
        let (mode, fell_back) = match self.catalog.game_mode(mode_name) {
            Some(mode) => (mode.clone(), false),
            None => {
                let fallback = self.catalog.fallback_game_mode().clone();
                warn!(
                    "⚠️ Game mode '{}' not found, falling back to '{}'",
                    mode_name,
                    fallback.name()
                );
                (fallback, true)
            }
        };

        self.host
            .print_to_chat_all(&format!("{actor} changed the game mode to {}", mode.name()));
        self.schedule(PendingChange::Mode(mode.clone()));
        Override { target: mode, fell_back }
    }

    /// Runs a setting's enable or disable action. Unknown settings change nothing.
    pub fn toggle_setting(&mut self, actor: &str, setting_name: &str, enable: bool) -> Result<Setting> {
        let setting = self
            .catalog
            .setting(setting_name)
            .cloned()
            .ok_or_else(|| RotationError::NotFound(format!("setting '{setting_name}'")))?;

        let verb = if enable { "enabled" } else { "disabled" };
        self.host
            .print_to_chat_all(&format!("{actor} {verb} setting {}", setting.name));
        self.host.execute_command(setting.action(enable));
        info!("⚙️ Setting '{}' {}", setting.name, verb);
        Ok(setting)
    }

    /// Applies the pending change if `generation` is still the latest one.
    ///
    /// Returns false for superseded or unknown generations.
    pub fn fire(&mut self, generation: u64) -> bool {
        match &self.pending {
            Some(pending) if pending.generation == generation => {}
            _ => {
                debug!("Scheduled change #{} was superseded, ignoring", generation);
                return false;
            }
        }
        let Some(pending) = self.pending.take() else {
            return false;
        };

        match pending.change {
            PendingChange::Map(map) => self.apply_map(map),
            PendingChange::Mode(mode) => self.apply_mode(mode),
        }
        self.settle();
        true
    }

    fn schedule(&mut self, change: PendingChange) {
        self.generation += 1;
        let delay = match &change {
            PendingChange::Map(_) => self.config.map_change_delay,
            PendingChange::Mode(_) => self.config.game_mode.delay,
        };

        if let Some(previous) = self.pending.replace(Pending {
            generation: self.generation,
            change,
        }) {
            info!("⏭️ Superseding scheduled change #{}", previous.generation);
        }

        self.phase = EnginePhase::Applying;
        debug!("Scheduled change #{} in {:?}", self.generation, delay);
        self.scheduler.schedule(delay, self.generation);
    }

    fn apply_map(&mut self, map: Map) {
        let change = LevelChange::resolve(&map, self.host.as_ref());
        info!("🗺️ Changing map to {}", map);
        self.host.execute_command(&change.command());
        if let Err(e) = self.state.set_current_map(map) {
            error!("❌ {}", e);
        }
    }

    fn apply_mode(&mut self, mode: GameMode) {
        info!("🎲 Changing game mode to {}", mode.name());
        self.host.execute_command(&mode.exec_command());

        // Modes named after a map group carry that group with them
        let group = self.catalog.map_group(mode.name()).cloned();
        if let Err(e) = self.state.set_current_mode(mode) {
            error!("❌ {}", e);
        }
        if let Some(group) = group {
            if group.name() != self.state.current_map_group().name() {
                self.adopt_group(group);
            }
        }
    }

    fn adopt_group(&mut self, group: MapGroup) {
        match self.state.set_current_map_group(group) {
            Ok(()) => self.sync_current_group(),
            Err(e) => error!("❌ {}", e),
        }
    }

    fn sync_current_group(&self) {
        // Failures are logged inside; the rotation carries on regardless
        let _ = self.sync.sync(self.state.current_map_group(), self.host.as_ref());
    }

    fn settle(&mut self) {
        self.phase = if self.pending.is_some() {
            EnginePhase::Applying
        } else {
            EnginePhase::Idle
        };
    }
}
