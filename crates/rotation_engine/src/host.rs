//! # Host Interface
//!
//! The rotation engine never talks to a game server directly. Everything it
//! needs from the hosting runtime goes through [`GameHost`], and the delayed
//! apply goes through [`ApplyScheduler`]. The application shell provides the
//! real implementations; tests provide recording ones.

use crate::catalog::Map;
use crate::votes::VoteDefinition;
use std::fmt::Debug;
use std::time::Duration;
use tracing::debug;

/// Services the hosting game server provides to the engine.
pub trait GameHost: Send + Sync + Debug {
    /// Returns true if the server has `map_name` installed locally.
    fn is_map_valid(&self, map_name: &str) -> bool;

    /// Issues a server console command. Fire-and-forget.
    fn execute_command(&self, command: &str);

    /// Prints a message to every player's chat.
    fn print_to_chat_all(&self, message: &str);

    /// Hands a vote definition to the vote integration.
    ///
    /// Hosts without a vote integration can keep the default, which only logs.
    fn register_vote(&self, vote: &VoteDefinition) {
        debug!("Vote '{}' not registered: host has no vote integration", vote.id);
    }
}

/// Fire-once timer used for the grace period before a change is applied.
///
/// When the delay elapses the implementation must hand `generation` back to
/// [`RotationEngine::fire`](crate::engine::RotationEngine::fire) on the
/// engine's own control thread. It never calls the engine itself.
pub trait ApplyScheduler: Send + Sync + Debug {
    fn schedule(&self, delay: Duration, generation: u64);
}

/// The host action used to switch to a map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelChange {
    /// Map is installed locally
    Local(String),
    /// Map is fetched by workshop id
    Workshop(String),
    /// Last resort, server-specific workshop changelevel by name
    WorkshopByName(String),
}

impl LevelChange {
    /// Chooses the first applicable tier for `map`.
    pub fn resolve(map: &Map, host: &dyn GameHost) -> Self {
        if host.is_map_valid(map.name()) {
            LevelChange::Local(map.name().to_string())
        } else if let Some(id) = map.workshop_id() {
            LevelChange::Workshop(id.to_string())
        } else {
            LevelChange::WorkshopByName(map.name().to_string())
        }
    }

    pub fn command(&self) -> String {
        match self {
            LevelChange::Local(name) => format!("changelevel \"{name}\""),
            LevelChange::Workshop(id) => format!("host_workshop_map \"{id}\""),
            LevelChange::WorkshopByName(name) => format!("ds_workshop_changelevel \"{name}\""),
        }
    }
}
