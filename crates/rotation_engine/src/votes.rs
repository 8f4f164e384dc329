//! Vote definitions handed to an external vote integration.
//!
//! A passed vote comes back to the engine as an ordinary operator command,
//! so every option carries the command text to dispatch.

use crate::catalog::Catalog;
use crate::config::VoteConfig;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteOption {
    pub label: String,
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteDefinition {
    pub id: String,
    pub description: String,
    pub options: Vec<VoteOption>,
}

/// Builds the votes enabled by `config` from the catalog.
pub fn build_votes(catalog: &Catalog, config: &VoteConfig) -> Vec<VoteDefinition> {
    if !config.enabled {
        return Vec::new();
    }

    let mut votes = Vec::new();

    if config.game_mode {
        votes.push(VoteDefinition {
            id: "changemode".to_string(),
            description: "Change the game mode".to_string(),
            options: catalog
                .game_modes()
                .iter()
                .map(|mode| VoteOption {
                    label: mode.name().to_string(),
                    command: format!("change-mode {}", mode.name()),
                })
                .collect(),
        });
    }

    if config.game_setting {
        for setting in catalog.settings() {
            votes.push(VoteDefinition {
                id: setting.name.clone(),
                description: format!("Change setting {}", setting.name),
                options: ["enable", "disable"]
                    .into_iter()
                    .map(|action| VoteOption {
                        label: action.to_string(),
                        command: format!("toggle-setting {action} {}", setting.name),
                    })
                    .collect(),
            });
        }
    }

    votes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{GameMode, Map, MapGroup, Setting};

    fn catalog() -> Catalog {
        let group = MapGroup::new("mg_active", vec![Map::local("de_dust2").unwrap()]).unwrap();
        let modes = vec![GameMode::new("comp").unwrap(), GameMode::new("wingman").unwrap()];
        let settings = vec![Setting {
            name: "ff".to_string(),
            enable_action: "exec settings/enable_ff.cfg".to_string(),
            disable_action: "exec settings/disable_ff.cfg".to_string(),
        }];
        Catalog::new(vec![group], modes, settings, "mg_active").unwrap()
    }

    #[test]
    fn test_disabled_builds_nothing() {
        let config = VoteConfig {
            enabled: false,
            game_mode: true,
            game_setting: true,
        };
        assert!(build_votes(&catalog(), &config).is_empty());
    }

    #[test]
    fn test_mode_and_setting_votes() {
        let config = VoteConfig {
            enabled: true,
            game_mode: true,
            game_setting: true,
        };
        let votes = build_votes(&catalog(), &config);
        assert_eq!(votes.len(), 2);

        assert_eq!(votes[0].id, "changemode");
        assert_eq!(votes[0].options[1].command, "change-mode wingman");

        assert_eq!(votes[1].id, "ff");
        assert_eq!(votes[1].options[0].command, "toggle-setting enable ff");
        assert_eq!(votes[1].options[1].command, "toggle-setting disable ff");
    }
}
