//! Logging configuration from TOML (`[logging]` section)
//!
//! ```toml
//! [logging]
//! events_file = "~/.local/share/superposition/events.jsonl"
//! log_dir = "/var/log/superposition"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Append orchestration events as JSON lines to this file
    pub events_file: Option<PathBuf>,
    /// Write daily-rotated tracing logs into this directory
    pub log_dir: Option<PathBuf>,
}

impl FileLoggingConfig {
    /// `events_file` with a leading `~` expanded to the home directory.
    pub fn events_path(&self) -> Option<PathBuf> {
        self.events_file.as_deref().map(expand_home)
    }

    pub fn log_dir_path(&self) -> Option<PathBuf> {
        self.log_dir.as_deref().map(expand_home)
    }
}

fn expand_home(path: &std::path::Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_outputs() {
        let config = FileLoggingConfig::default();
        assert!(config.events_path().is_none());
        assert!(config.log_dir_path().is_none());
    }

    #[test]
    fn test_absolute_path_unchanged() {
        let config: FileLoggingConfig =
            toml::from_str(r#"events_file = "/tmp/events.jsonl""#).unwrap();
        assert_eq!(config.events_path(), Some(PathBuf::from("/tmp/events.jsonl")));
    }

    #[test]
    fn test_home_is_expanded() {
        let config = FileLoggingConfig {
            events_file: Some(PathBuf::from("~/events.jsonl")),
            log_dir: None,
        };
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.events_path(), Some(home.join("events.jsonl")));
        }
    }
}
