use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tidal_logging::{tidal_info, tidal_warn, LogDestination};

use crate::todo::Settings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub url: String,
    /// Per-request timeout; `None` waits for the server indefinitely.
    pub timeout_ms: Option<u64>,
    pub tick_interval_ms: u64,
    pub max_ticks: u32,
    pub retries: u32,
    pub log: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            url: "https://jsonplaceholder.typicode.com/todos/1".to_string(),
            timeout_ms: Some(5_000),
            tick_interval_ms: 250,
            max_ticks: 4,
            retries: 1,
            log: LogDestination::Terminal,
        }
    }
}

impl AppConfig {
    pub fn settings(&self) -> Settings {
        Settings {
            url: self.url.clone(),
            timeout: self.timeout_ms.map(Duration::from_millis),
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            max_ticks: self.max_ticks,
            retries: self.retries,
        }
    }
}

/// Reads the config at `path`. A missing or unreadable file falls back to
/// the defaults.
pub(crate) fn load(path: &Path) -> AppConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return AppConfig::default();
        }
        Err(err) => {
            tidal_warn!("Failed to read config from {:?}: {}", path, err);
            return AppConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            tidal_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            tidal_warn!("Failed to parse config from {:?}: {}", path, err);
            AppConfig::default()
        }
    }
}

pub(crate) fn save(path: &Path, config: &AppConfig) -> anyhow::Result<()> {
    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        assert_eq!(load(&temp.path().join("tidal.ron")), AppConfig::default());
    }

    #[test]
    fn saved_config_loads_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tidal.ron");
        let config = AppConfig {
            url: "http://localhost:8080/todos/2".to_string(),
            timeout_ms: None,
            max_ticks: 0,
            log: LogDestination::File(temp.path().join("tidal.log")),
            ..AppConfig::default()
        };

        save(&path, &config).unwrap();
        assert_eq!(load(&path), config);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tidal.ron");
        fs::write(&path, "(url: \"http://localhost/todos/3\", retries: 0)").unwrap();

        let config = load(&path);
        assert_eq!(config.url, "http://localhost/todos/3");
        assert_eq!(config.retries, 0);
        assert_eq!(config.tick_interval_ms, AppConfig::default().tick_interval_ms);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tidal.ron");
        fs::write(&path, "not ron at all {").unwrap();
        assert_eq!(load(&path), AppConfig::default());
    }

    #[test]
    fn example_config_parses() {
        let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tidal.example.ron"));
        let config = load(path);
        assert_eq!(config.log, LogDestination::Both("tidal.log".into()));
        assert_eq!(config.timeout_ms, Some(5000));
    }

    #[test]
    fn settings_convert_milliseconds() {
        let settings = AppConfig::default().settings();
        assert_eq!(settings.timeout, Some(Duration::from_millis(5_000)));
        assert_eq!(settings.tick_interval, Duration::from_millis(250));
    }
}
