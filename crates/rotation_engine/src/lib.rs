//! # Rotation Engine - Map and Game Mode Rotation Core
//!
//! Decides what a dedicated game server plays next. The engine owns the
//! rotation state (current map, map group, game mode and rotation counter),
//! picks the next map or game mode at match end, and applies operator
//! overrides. It never talks to a server process itself; every side effect
//! goes through the [`GameHost`] and [`ApplyScheduler`] traits.
//!
//! ## Design Philosophy
//!
//! * **Never unplayable** - empty groups, unknown names and broken catalog
//!   entries are rejected or replaced by a fallback, never adopted
//! * **Single owner** - one [`RotationEngine`] owns the state and is driven
//!   from one control thread; nothing here is a global
//! * **Reproducible** - all randomness comes from the generator the engine
//!   is constructed with
//!
//! ## Architecture Overview
//!
//! * **Catalog** - map groups, game modes and settings, read-only after load
//! * **State** - the only writer of current map, group, mode and counter
//! * **Selection** - pure policy for the next map or mode
//! * **Engine** - match-end state machine and overrides
//! * **Sync** - writes the active group for an external vote plugin
//! * **Commands** - operator command parsing and dispatch
//!
//! ## Match End Flow
//!
//! 1. The host reports a match end
//! 2. The engine bumps the rotation counter
//! 3. With RTV compatibility on, the external plugin chooses and nothing is scheduled
//! 4. Otherwise a mode change (every `interval` matches) or a map change is picked
//! 5. The change is announced and scheduled after a grace period
//! 6. When the timer fires, the host receives the level change or mode exec
//!
//! ```rust
//! # use rotation_engine::*;
//! # use std::sync::Arc;
//! # use std::time::Duration;
//! # use rand::SeedableRng;
//! #[derive(Debug)]
//! struct Console;
//! impl GameHost for Console {
//!     fn is_map_valid(&self, _map: &str) -> bool { true }
//!     fn execute_command(&self, command: &str) { println!("> {command}"); }
//!     fn print_to_chat_all(&self, message: &str) { println!("[chat] {message}"); }
//! }
//! #[derive(Debug)]
//! struct Immediate;
//! impl ApplyScheduler for Immediate {
//!     fn schedule(&self, _delay: Duration, _generation: u64) {}
//! }
//!
//! let catalog = Catalog::new(
//!     vec![MapGroup::new("mg_active", vec![Map::local("de_dust2")?, Map::local("de_nuke")?])?],
//!     vec![GameMode::new("casual")?],
//!     Vec::new(),
//!     "mg_active",
//! )?;
//! let mut config = RotationConfig::default();
//! config.game_mode.enabled = false;
//!
//! let mut engine = RotationEngine::new(
//!     config,
//!     Arc::new(catalog),
//!     Arc::new(Console),
//!     Arc::new(Immediate),
//!     rand_chacha::ChaCha8Rng::seed_from_u64(7),
//! );
//! engine.start();
//! engine.on_map_start("de_dust2");
//! assert!(matches!(engine.on_match_end(), MatchEndOutcome::Scheduled(_)));
//! # Ok::<(), RotationError>(())
//! ```

// Re-export core types and functions for easy access
pub use catalog::{Catalog, CatalogSources, GameMode, Map, MapGroup, Setting};
pub use commands::{dispatch, parse_command, Command, CommandParseError, CommandReply};
pub use config::{GameModeRotationConfig, MapListFormat, RotationConfig, RtvConfig, VoteConfig};
pub use engine::{EnginePhase, MatchEndOutcome, Override, PendingChange, RotationEngine};
pub use error::{Result, RotationError};
pub use host::{ApplyScheduler, GameHost, LevelChange};
pub use state::{RotationSnapshot, RotationState};
pub use sync::MapListSync;
pub use votes::{build_votes, VoteDefinition, VoteOption};

// Public module declarations
pub mod catalog;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod selection;
pub mod state;
pub mod sync;
pub mod votes;

#[cfg(test)]
mod tests;
