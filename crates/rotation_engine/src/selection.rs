//! Selection policy: picks the next map or game mode.
//!
//! Both functions are pure apart from drawing from the supplied random
//! source, so a seeded generator makes every choice reproducible.

use crate::catalog::{Catalog, GameMode, Map, MapGroup};
use crate::error::{Result, RotationError};
use rand::Rng;

/// Picks a map uniformly at random from `group`.
///
/// With `exclude_current` set and more than one map in the group, `current`
/// is removed from the candidates first. Exclusion is best-effort: a group
/// whose only map is the current one still returns that map.
pub fn pick_next_map<R: Rng + ?Sized>(
    group: &MapGroup,
    current: Option<&Map>,
    exclude_current: bool,
    rng: &mut R,
) -> Result<Map> {
    let maps = group.maps();
    if maps.is_empty() {
        return Err(RotationError::EmptyGroup(group.name().to_string()));
    }

    let mut candidates: Vec<&Map> = maps.iter().collect();
    if exclude_current && maps.len() > 1 {
        if let Some(current) = current {
            candidates.retain(|m| *m != current);
        }
        if candidates.is_empty() {
            candidates = maps.iter().collect();
        }
    }

    let index = rng.gen_range(0..candidates.len());
    Ok(candidates[index].clone())
}

/// Picks a game mode uniformly at random from the catalog.
pub fn pick_next_game_mode<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> Result<GameMode> {
    let modes = catalog.game_modes();
    if modes.is_empty() {
        return Err(RotationError::EmptySelection("game mode catalog is empty".to_string()));
    }
    let index = rng.gen_range(0..modes.len());
    Ok(modes[index].clone())
}

/// Returns true when the match end for `counter` should change the mode.
pub fn is_mode_change_due(counter: u64, interval: u64) -> bool {
    interval > 0 && counter % interval == 0
}
