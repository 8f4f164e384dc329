//! External sync: keeps the vote plugin's map list in step with the active
//! map group.

use crate::catalog::{Map, MapGroup};
use crate::config::{MapListFormat, RtvConfig};
use crate::error::Result;
use crate::host::GameHost;
use std::path::Path;
use tracing::{error, info};

/// Formats one map-list line.
pub fn format_entry(map: &Map, format: MapListFormat) -> String {
    match (map.workshop_id(), format) {
        (None, _) => map.name().to_string(),
        (Some(id), MapListFormat::IdOnly) => format!("ws:{id}"),
        (Some(id), MapListFormat::NameAndId) => format!("{}:{id}", map.name()),
    }
}

/// Renders the whole list file, one newline-terminated line per map.
pub fn render_map_list(group: &MapGroup, format: MapListFormat) -> String {
    let mut out = String::new();
    for map in group.maps() {
        out.push_str(&format_entry(map, format));
        out.push('\n');
    }
    out
}

pub fn write_map_list(path: &Path, group: &MapGroup, format: MapListFormat) -> std::io::Result<()> {
    std::fs::write(path, render_map_list(group, format))
}

/// Writes map lists for the external vote plugin and asks it to reload.
#[derive(Debug, Clone)]
pub struct MapListSync {
    config: RtvConfig,
}

impl MapListSync {
    pub fn new(config: RtvConfig) -> Self {
        Self { config }
    }

    /// Rewrites the list file for `group` and reloads the plugin.
    ///
    /// Does nothing when compatibility is disabled. A failed write is logged
    /// and returned, and the plugin is not reloaded.
    pub fn sync(&self, group: &MapGroup, host: &dyn GameHost) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }

        if let Err(e) = write_map_list(&self.config.map_list_file, group, self.config.format) {
            error!(
                "❌ Could not update map list {}: {}",
                self.config.map_list_file.display(),
                e
            );
            return Err(e.into());
        }

        info!(
            "📝 Wrote {} maps of '{}' to {}",
            group.maps().len(),
            group.name(),
            self.config.map_list_file.display()
        );
        host.execute_command(&self.reload_command());
        Ok(())
    }

    pub fn reload_command(&self) -> String {
        format!("css_plugins reload {}", self.config.plugin.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RotationError;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Debug, Default)]
    struct RecordingHost {
        commands: Mutex<Vec<String>>,
    }

    impl GameHost for RecordingHost {
        fn is_map_valid(&self, _map_name: &str) -> bool {
            true
        }
        fn execute_command(&self, command: &str) {
            self.commands.lock().unwrap().push(command.to_string());
        }
        fn print_to_chat_all(&self, _message: &str) {}
    }

    fn group() -> MapGroup {
        MapGroup::new(
            "mg_active",
            vec![Map::local("de_dust2").unwrap(), Map::new("de_nuke", "730").unwrap()],
        )
        .unwrap()
    }

    fn rtv(path: PathBuf, format: MapListFormat) -> RtvConfig {
        RtvConfig {
            enabled: true,
            plugin: PathBuf::from("plugins/RockTheVote/RockTheVote.dll"),
            map_list_file: path,
            format,
        }
    }

    #[test]
    fn test_default_format_lines() {
        assert_eq!(
            render_map_list(&group(), MapListFormat::NameAndId),
            "de_dust2\nde_nuke:730\n"
        );
    }

    #[test]
    fn test_id_only_format_lines() {
        assert_eq!(render_map_list(&group(), MapListFormat::IdOnly), "de_dust2\nws:730\n");
    }

    #[test]
    fn test_sync_writes_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("maplist.txt");
        let host = RecordingHost::default();

        let sync = MapListSync::new(rtv(path.clone(), MapListFormat::NameAndId));
        sync.sync(&group(), &host).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().collect::<Vec<_>>(), vec!["de_dust2", "de_nuke:730"]);
        assert_eq!(
            *host.commands.lock().unwrap(),
            vec!["css_plugins reload plugins/RockTheVote/RockTheVote.dll".to_string()]
        );
    }

    #[test]
    fn test_sync_failure_skips_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing_dir").join("maplist.txt");
        let host = RecordingHost::default();

        let sync = MapListSync::new(rtv(path, MapListFormat::IdOnly));
        let err = sync.sync(&group(), &host).unwrap_err();

        assert!(matches!(err, RotationError::Io(_)));
        assert!(host.commands.lock().unwrap().is_empty());
    }

    #[test]
    fn test_sync_disabled_is_noop() {
        let host = RecordingHost::default();
        let mut config = rtv(PathBuf::from("/nonexistent/maplist.txt"), MapListFormat::IdOnly);
        config.enabled = false;

        MapListSync::new(config).sync(&group(), &host).unwrap();
        assert!(host.commands.lock().unwrap().is_empty());
    }
}
