use crate::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Debug, Default)]
struct RecordingHost {
    installed: Vec<String>,
    commands: Mutex<Vec<String>>,
    chat: Mutex<Vec<String>>,
    votes: Mutex<Vec<String>>,
}

impl RecordingHost {
    fn with_installed(maps: &[&str]) -> Self {
        Self {
            installed: maps.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

impl GameHost for RecordingHost {
    fn is_map_valid(&self, map_name: &str) -> bool {
        self.installed.iter().any(|m| m == map_name)
    }

    fn execute_command(&self, command: &str) {
        self.commands.lock().unwrap().push(command.to_string());
    }

    fn print_to_chat_all(&self, message: &str) {
        self.chat.lock().unwrap().push(message.to_string());
    }

    fn register_vote(&self, vote: &VoteDefinition) {
        self.votes.lock().unwrap().push(vote.id.clone());
    }
}

#[derive(Debug, Default)]
struct RecordingScheduler {
    scheduled: Mutex<Vec<(Duration, u64)>>,
}

impl RecordingScheduler {
    fn last_generation(&self) -> u64 {
        self.scheduled.lock().unwrap().last().map(|(_, g)| *g).unwrap()
    }
}

impl ApplyScheduler for RecordingScheduler {
    fn schedule(&self, delay: Duration, generation: u64) {
        self.scheduled.lock().unwrap().push((delay, generation));
    }
}

fn maps(names: &[&str]) -> Vec<Map> {
    names.iter().map(|n| Map::local(*n).unwrap()).collect()
}

fn catalog() -> Catalog {
    let groups = vec![
        MapGroup::new("mg_active", maps(&["de_dust2", "de_mirage", "de_nuke"])).unwrap(),
        MapGroup::new("mg_aim", maps(&["aim_map", "aim_redline"])).unwrap(),
        MapGroup::new(
            "wingman",
            vec![Map::local("de_vertigo").unwrap(), Map::new("de_cache", "3070212801").unwrap()],
        )
        .unwrap(),
    ];
    let modes = vec![
        GameMode::new("comp").unwrap(),
        GameMode::new("wingman").unwrap(),
    ];
    let settings = vec![Setting {
        name: "friendly_fire".to_string(),
        enable_action: "exec settings/enable_friendly_fire.cfg".to_string(),
        disable_action: "exec settings/disable_friendly_fire.cfg".to_string(),
    }];
    Catalog::new(groups, modes, settings, "mg_active").unwrap()
}

fn base_config() -> RotationConfig {
    let mut config = RotationConfig::default();
    config.game_mode.enabled = false;
    config.map_change_delay = Duration::from_secs(5);
    config.game_mode.delay = Duration::from_secs(3);
    config
}

struct Harness {
    engine: RotationEngine<ChaCha8Rng>,
    host: Arc<RecordingHost>,
    scheduler: Arc<RecordingScheduler>,
}

fn harness(config: RotationConfig, host: RecordingHost) -> Harness {
    let host = Arc::new(host);
    let scheduler = Arc::new(RecordingScheduler::default());
    let engine = RotationEngine::new(
        config,
        Arc::new(catalog()),
        host.clone(),
        scheduler.clone(),
        ChaCha8Rng::seed_from_u64(42),
    );
    Harness {
        engine,
        host,
        scheduler,
    }
}

#[test]
fn test_match_end_picks_other_map_in_group() {
    for seed in 0..20 {
        let host = Arc::new(RecordingHost::with_installed(&["de_dust2", "de_mirage", "de_nuke"]));
        let scheduler = Arc::new(RecordingScheduler::default());
        let mut engine = RotationEngine::new(
            base_config(),
            Arc::new(catalog()),
            host.clone(),
            scheduler.clone(),
            ChaCha8Rng::seed_from_u64(seed),
        );
        engine.on_map_start("de_mirage");

        let outcome = engine.on_match_end();
        let MatchEndOutcome::Scheduled(PendingChange::Map(next)) = outcome else {
            panic!("expected a scheduled map change, got {outcome:?}");
        };
        assert!(["de_dust2", "de_nuke"].contains(&next.name()));

        assert!(engine.fire(scheduler.last_generation()));
        assert_eq!(host.commands(), vec![format!("changelevel \"{}\"", next.name())]);
        assert_eq!(engine.state().current_map(), Some(&next));
        assert_eq!(engine.phase(), EnginePhase::Idle);
    }
}

#[test]
fn test_counter_increments_once_per_cycle_on_every_branch() {
    // Map branch
    let mut h = harness(base_config(), RecordingHost::default());
    h.engine.on_match_end();
    assert_eq!(h.engine.state().rotation_counter(), 1);

    // Mode branch
    let mut config = base_config();
    config.game_mode.enabled = true;
    config.game_mode.interval = 1;
    let mut h = harness(config, RecordingHost::default());
    assert!(matches!(
        h.engine.on_match_end(),
        MatchEndOutcome::Scheduled(PendingChange::Mode(_))
    ));
    assert_eq!(h.engine.state().rotation_counter(), 1);

    // RTV branch
    let mut config = base_config();
    config.rtv.enabled = true;
    let mut h = harness(config, RecordingHost::default());
    assert_eq!(h.engine.on_match_end(), MatchEndOutcome::Delegated);
    assert_eq!(h.engine.state().rotation_counter(), 1);
}

#[test]
fn test_mode_change_every_interval() {
    let mut config = base_config();
    config.game_mode.enabled = true;
    config.game_mode.interval = 3;
    let mut h = harness(config, RecordingHost::default());

    let mut mode_cycles = Vec::new();
    for cycle in 0..9u64 {
        if let MatchEndOutcome::Scheduled(PendingChange::Mode(_)) = h.engine.on_match_end() {
            mode_cycles.push(cycle);
        }
        h.engine.fire(h.scheduler.last_generation());
    }
    assert_eq!(mode_cycles, vec![0, 3, 6]);
}

#[test]
fn test_mode_apply_execs_config_and_adopts_group() {
    let mut h = harness(base_config(), RecordingHost::default());

    let result = h.engine.change_mode("admin", "wingman");
    assert!(!result.fell_back);
    assert_eq!(
        h.scheduler.scheduled.lock().unwrap().last(),
        Some(&(Duration::from_secs(3), 1))
    );

    assert!(h.engine.fire(1));
    assert_eq!(h.host.commands(), vec!["exec wingman.cfg".to_string()]);
    assert_eq!(h.engine.state().current_mode().map(|m| m.name()), Some("wingman"));
    assert_eq!(h.engine.state().current_map_group().name(), "wingman");
}

#[test]
fn test_unknown_mode_falls_back_to_first() {
    let mut h = harness(base_config(), RecordingHost::default());
    let result = h.engine.change_mode("admin", "gungame");
    assert!(result.fell_back);
    assert_eq!(result.target.name(), "comp");
}

#[test]
fn test_rtv_delegation_issues_no_commands() {
    let mut config = base_config();
    config.rtv.enabled = true;
    config.rtv.map_list_file = PathBuf::from("/nonexistent/maplist.txt");
    let mut h = harness(config, RecordingHost::default());

    assert_eq!(h.engine.on_match_end(), MatchEndOutcome::Delegated);
    assert!(h.host.commands().is_empty());
    assert!(h.scheduler.scheduled.lock().unwrap().is_empty());
    assert_eq!(h.engine.phase(), EnginePhase::Idle);
}

#[test]
fn test_later_override_supersedes_pending_change() {
    let mut h = harness(base_config(), RecordingHost::with_installed(&["de_nuke", "aim_map"]));

    h.engine.change_map("admin", "de_nuke", None);
    let first = h.scheduler.last_generation();
    h.engine.change_map("admin", "aim_map", None);
    let second = h.scheduler.last_generation();
    assert_ne!(first, second);

    assert!(!h.engine.fire(first));
    assert!(h.host.commands().is_empty());

    assert!(h.engine.fire(second));
    assert_eq!(h.host.commands(), vec!["changelevel \"aim_map\"".to_string()]);

    // A stale timer after the apply is still a no-op
    assert!(!h.engine.fire(first));
    assert_eq!(h.host.commands().len(), 1);
}

#[test]
fn test_override_supersedes_match_end_decision() {
    let mut h = harness(base_config(), RecordingHost::with_installed(&["aim_redline"]));
    h.engine.on_map_start("de_dust2");

    h.engine.on_match_end();
    let from_match_end = h.scheduler.last_generation();
    h.engine.change_map("admin", "aim_redline", None);

    assert!(!h.engine.fire(from_match_end));
    assert_eq!(h.engine.phase(), EnginePhase::Applying);
    assert!(h.engine.fire(h.scheduler.last_generation()));
    assert_eq!(h.engine.state().current_map().map(|m| m.name()), Some("aim_redline"));
}

#[test]
fn test_change_map_fallbacks() {
    let mut h = harness(base_config(), RecordingHost::with_installed(&["de_inferno"]));

    let workshop = h.engine.change_map("admin", "de_overpass", Some("123456"));
    assert!(!workshop.fell_back);
    assert_eq!(workshop.target.workshop_id(), Some("123456"));

    let installed = h.engine.change_map("admin", "de_inferno", None);
    assert!(!installed.fell_back);

    let unknown = h.engine.change_map("admin", "de_nowhere", None);
    assert!(unknown.fell_back);
    assert_eq!(unknown.target.name(), "de_dust2");

    let empty_id = h.engine.change_map("admin", "de_nowhere", Some(""));
    assert!(empty_id.fell_back);
}

#[test]
fn test_workshop_map_uses_workshop_command() {
    let mut h = harness(base_config(), RecordingHost::default());
    h.engine.change_map("admin", "de_cache", None);
    h.engine.fire(h.scheduler.last_generation());
    assert_eq!(h.host.commands(), vec!["host_workshop_map \"3070212801\"".to_string()]);
}

#[test]
fn test_unknown_map_group_uses_default() {
    let mut h = harness(base_config(), RecordingHost::default());
    h.engine.set_map_group("mg_aim");
    assert_eq!(h.engine.state().current_map_group().name(), "mg_aim");

    let result = h.engine.set_map_group("mg_nonexistent");
    assert!(result.fell_back);
    assert_eq!(result.target, "mg_active");
    assert_eq!(h.engine.state().current_map_group().name(), "mg_active");
    assert!(h.engine.pending_change().is_none());
}

#[test]
fn test_unknown_setting_changes_nothing() {
    let mut h = harness(base_config(), RecordingHost::default());
    let before = h.engine.snapshot();

    let err = h.engine.toggle_setting("admin", "no_such_setting", true).unwrap_err();
    assert!(matches!(err, RotationError::NotFound(_)));
    assert!(h.host.commands().is_empty());
    assert!(h.host.chat.lock().unwrap().is_empty());

    let after = h.engine.snapshot();
    assert_eq!(before.current_map_group, after.current_map_group);
    assert_eq!(before.rotation_counter, after.rotation_counter);
}

#[test]
fn test_toggle_setting_runs_matching_action() {
    let mut h = harness(base_config(), RecordingHost::default());
    h.engine.toggle_setting("admin", "friendly_fire", true).unwrap();
    h.engine.toggle_setting("admin", "friendly_fire", false).unwrap();
    assert_eq!(
        h.host.commands(),
        vec![
            "exec settings/enable_friendly_fire.cfg".to_string(),
            "exec settings/disable_friendly_fire.cfg".to_string(),
        ]
    );
}

#[test]
fn test_map_list_synced_on_start_and_group_change() {
    let dir = TempDir::new().unwrap();
    let list = dir.path().join("maplist.txt");
    let mut config = base_config();
    config.rtv.enabled = true;
    config.rtv.plugin = PathBuf::from("RockTheVote.dll");
    config.rtv.map_list_file = list.clone();
    let mut h = harness(config, RecordingHost::default());

    h.engine.start();
    assert_eq!(
        std::fs::read_to_string(&list).unwrap(),
        "de_dust2\nde_mirage\nde_nuke\n"
    );

    h.engine.set_map_group("wingman");
    assert_eq!(
        std::fs::read_to_string(&list).unwrap(),
        "de_vertigo\nde_cache:3070212801\n"
    );
    assert_eq!(
        h.host.commands(),
        vec![
            "css_plugins reload RockTheVote.dll".to_string(),
            "css_plugins reload RockTheVote.dll".to_string(),
        ]
    );
}

#[test]
fn test_failed_map_list_write_does_not_block_mode_change() {
    let dir = TempDir::new().unwrap();
    let mut config = base_config();
    config.rtv.enabled = true;
    // A directory cannot be written as a file
    config.rtv.map_list_file = dir.path().to_path_buf();
    let mut h = harness(config, RecordingHost::default());

    h.engine.start();
    h.engine.change_mode("admin", "wingman");
    assert!(h.engine.fire(h.scheduler.last_generation()));

    assert_eq!(h.host.commands(), vec!["exec wingman.cfg".to_string()]);
    assert!(!h.host.commands().iter().any(|c| c.starts_with("css_plugins reload")));
    assert_eq!(h.engine.state().current_map_group().name(), "wingman");
    assert_eq!(h.engine.state().current_mode().map(|m| m.name()), Some("wingman"));
    assert_eq!(h.engine.phase(), EnginePhase::Idle);
}

#[test]
fn test_start_registers_votes() {
    let mut config = base_config();
    config.votes = VoteConfig {
        enabled: true,
        game_mode: true,
        game_setting: true,
    };
    let mut h = harness(config, RecordingHost::default());
    h.engine.start();
    assert_eq!(
        *h.host.votes.lock().unwrap(),
        vec!["changemode".to_string(), "friendly_fire".to_string()]
    );
}

#[test]
fn test_unknown_map_start_is_recorded() {
    let mut h = harness(base_config(), RecordingHost::default());
    h.engine.on_map_start("cs_office");
    assert_eq!(h.engine.state().current_map().map(|m| m.name()), Some("cs_office"));
    assert_eq!(h.engine.state().current_map().and_then(|m| m.workshop_id()), None);

    h.engine.on_map_start("de_cache");
    assert_eq!(
        h.engine.state().current_map().and_then(|m| m.workshop_id()),
        Some("3070212801")
    );
}

#[test]
fn test_dispatch_routes_commands() {
    let mut h = harness(base_config(), RecordingHost::with_installed(&["de_nuke"]));

    let reply = dispatch(&mut h.engine, "console", parse_command("css_mapgroup mg_aim").unwrap());
    assert!(reply.success);
    assert_eq!(h.engine.state().current_map_group().name(), "mg_aim");

    let reply = dispatch(&mut h.engine, "console", parse_command("list-maps").unwrap());
    assert_eq!(reply.lines, vec!["Maps in 'mg_aim':", "  aim_map", "  aim_redline"]);

    let reply = dispatch(
        &mut h.engine,
        "console",
        parse_command("toggle-setting enable bogus").unwrap(),
    );
    assert!(!reply.success);
    assert_eq!(reply.lines, vec!["Can't find setting: bogus"]);

    let reply = dispatch(&mut h.engine, "console", parse_command("change-map de_nuke").unwrap());
    assert!(reply.success);
    assert_eq!(h.engine.phase(), EnginePhase::Applying);
}
