//! Console stand-ins for the game host.
//!
//! [`ConsoleHost`] reports host commands and chat through the log, and
//! checks map validity against the game directory. [`TokioScheduler`] runs
//! the grace-period timers on the tokio runtime and posts fired generations
//! back to the event loop over a channel.

use rotation_engine::{
    dispatch, parse_command, ApplyScheduler, Command, CommandParseError, EnginePhase, GameHost,
    RotationEngine, RotationSnapshot, VoteDefinition,
};
use rand::Rng;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Name used as the actor for commands typed on the console.
pub const CONSOLE_ACTOR: &str = "Console";

#[derive(Debug, Clone)]
pub struct ConsoleHost {
    game_dir: PathBuf,
}

impl ConsoleHost {
    pub fn new(game_dir: impl Into<PathBuf>) -> Self {
        Self {
            game_dir: game_dir.into(),
        }
    }
}

impl GameHost for ConsoleHost {
    fn is_map_valid(&self, map_name: &str) -> bool {
        !map_name.is_empty()
            && !map_name.contains(['/', '\\'])
            && self.game_dir.join("maps").join(format!("{map_name}.vpk")).is_file()
    }

    fn execute_command(&self, command: &str) {
        info!("🖥️ > {}", command);
    }

    fn print_to_chat_all(&self, message: &str) {
        info!("💬 {}", message);
    }

    fn register_vote(&self, vote: &VoteDefinition) {
        let options: Vec<&str> = vote.options.iter().map(|o| o.label.as_str()).collect();
        info!("🗳️ Vote '{}' ({}): {}", vote.id, vote.description, options.join(" | "));
    }
}

/// Fire-once timers on the current tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    fired: mpsc::UnboundedSender<u64>,
}

impl TokioScheduler {
    /// Creates a scheduler and the receiver its timers report to.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<u64>) {
        let (fired, rx) = mpsc::unbounded_channel();
        (Self { fired }, rx)
    }
}

impl ApplyScheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, generation: u64) {
        let fired = self.fired.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if fired.send(generation).is_err() {
                debug!("Event loop gone, dropping scheduled change #{}", generation);
            }
        });
    }
}

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    MatchEnd,
    MapStart(String),
    Status,
    Help,
    Quit,
    Command(Command),
}

impl ConsoleInput {
    /// Parses a console line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandParseError> {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Ok(None);
        };

        let input = match first.to_ascii_lowercase().as_str() {
            "match-end" => ConsoleInput::MatchEnd,
            "map-start" => {
                let map = words.next().ok_or(CommandParseError::Usage("map-start <map>"))?;
                ConsoleInput::MapStart(map.to_string())
            }
            "status" => ConsoleInput::Status,
            "help" => ConsoleInput::Help,
            "quit" | "exit" => ConsoleInput::Quit,
            _ => ConsoleInput::Command(parse_command(line)?),
        };
        Ok(Some(input))
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    #[serde(flatten)]
    state: RotationSnapshot,
    phase: EnginePhase,
}

/// Output of a console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleOutput {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl ConsoleOutput {
    fn lines(lines: Vec<String>) -> Self {
        Self { lines, quit: false }
    }
}

/// Runs one console line against the engine.
pub fn handle_line<R: Rng>(engine: &mut RotationEngine<R>, line: &str) -> ConsoleOutput {
    let input = match ConsoleInput::parse(line) {
        Ok(Some(input)) => input,
        Ok(None) => return ConsoleOutput::lines(Vec::new()),
        Err(e) => return ConsoleOutput::lines(vec![format!("{e}"), "Type 'help' for commands".to_string()]),
    };

    match input {
        ConsoleInput::MatchEnd => {
            let outcome = engine.on_match_end();
            ConsoleOutput::lines(vec![format!("Match end: {outcome:?}")])
        }
        ConsoleInput::MapStart(map) => {
            engine.on_map_start(&map);
            ConsoleOutput::lines(Vec::new())
        }
        ConsoleInput::Status => {
            let report = StatusReport {
                state: engine.snapshot(),
                phase: engine.phase(),
            };
            match serde_json::to_string_pretty(&report) {
                Ok(json) => ConsoleOutput::lines(vec![json]),
                Err(e) => ConsoleOutput::lines(vec![format!("Could not render status: {e}")]),
            }
        }
        ConsoleInput::Help => ConsoleOutput::lines(help_lines()),
        ConsoleInput::Quit => ConsoleOutput {
            lines: Vec::new(),
            quit: true,
        },
        ConsoleInput::Command(command) => {
            ConsoleOutput::lines(dispatch(engine, CONSOLE_ACTOR, command).lines)
        }
    }
}

fn help_lines() -> Vec<String> {
    let mut lines = vec![
        "match-end".to_string(),
        "map-start <map>".to_string(),
        "status".to_string(),
        "quit".to_string(),
    ];
    for name in [
        "set-map-group",
        "list-maps",
        "change-map",
        "change-mode",
        "list-modes",
        "toggle-setting",
        "list-settings",
    ] {
        if let Some(usage) = Command::usage(name) {
            lines.push(usage.to_string());
        }
    }
    lines
}
