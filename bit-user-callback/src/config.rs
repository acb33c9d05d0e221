//! Callback configuration
//!
//! Stored as JSON next to the Back In Time configuration:
//! `$XDG_CONFIG_HOME/backintime/user-callback.json`, falling back to
//! `~/.config/backintime/user-callback.json`.

use crate::duration::HumanDuration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "user-callback.json";
pub const DEFAULT_IWCONFIG: &str = "/sbin/iwconfig";
pub const DEFAULT_REMOTE: &str = "255.255.255.255:9";
pub const DEFAULT_DELAY: HumanDuration = HumanDuration::from_secs(20);
pub const DEFAULT_TIMEOUT: HumanDuration = HumanDuration::from_secs(10 * 60);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to open config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error parsing config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write config file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackConfig {
    #[serde(rename = "iwconfig-path")]
    pub iwconfig_path: PathBuf,
    #[serde(rename = "logfile", skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    pub verbose: bool,

    pub profile: String,
    pub essid: String,
    pub server: String,

    #[serde(rename = "wake-mac")]
    pub mac: String,
    #[serde(rename = "wake-delay")]
    pub delay: HumanDuration,
    #[serde(rename = "wake-timeout")]
    pub timeout: HumanDuration,
    #[serde(rename = "wake-local")]
    pub local: String,
    #[serde(rename = "wake-remote")]
    pub remote: String,
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            iwconfig_path: PathBuf::from(DEFAULT_IWCONFIG),
            log_file: None,
            verbose: false,
            profile: String::new(),
            essid: String::new(),
            server: String::new(),
            mac: String::new(),
            delay: HumanDuration::ZERO,
            timeout: HumanDuration::ZERO,
            local: String::new(),
            remote: DEFAULT_REMOTE.to_string(),
        }
    }
}

impl CallbackConfig {
    /// Template written by `--genconf`.
    pub fn template() -> Self {
        Self {
            iwconfig_path: find_in_path("iwconfig").unwrap_or_else(|| PathBuf::from(DEFAULT_IWCONFIG)),
            delay: DEFAULT_DELAY,
            timeout: DEFAULT_TIMEOUT,
            ..Self::default()
        }
    }

    /// Back In Time configuration directory holding the callback and its config.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        path.push("backintime");
        Ok(path)
    }

    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    pub async fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_file_path()?).await
    }

    pub async fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_json(&content).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub async fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write { path: path.to_path_buf(), source };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Write { path: path.to_path_buf(), source: e.into() })?;
        tokio::fs::write(path, content).await.map_err(write_err)
    }
}

/// First executable named `name` on `PATH`.
fn find_in_path(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const FULL: &str = r#"{
        "iwconfig-path": "/usr/sbin/iwconfig",
        "logfile": "/tmp/user-callback.log",
        "verbose": true,
        "profile": "Main",
        "essid": "HomeNet",
        "server": "http://backup.lan:8080/ready",
        "wake-mac": "00:11:22:33:44:55",
        "wake-delay": "20s",
        "wake-timeout": "600",
        "wake-local": "192.168.1.10:0",
        "wake-remote": "192.168.1.255:9"
    }"#;

    #[test]
    fn test_parse_full_document() {
        let config = CallbackConfig::from_json(FULL).unwrap();
        assert_eq!(config.iwconfig_path, PathBuf::from("/usr/sbin/iwconfig"));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/user-callback.log")));
        assert!(config.verbose);
        assert_eq!(config.profile, "Main");
        assert_eq!(config.essid, "HomeNet");
        assert_eq!(config.mac, "00:11:22:33:44:55");
        assert_eq!(config.delay.get(), Duration::from_secs(20));
        assert_eq!(config.timeout.get(), Duration::from_secs(600));
        assert_eq!(config.local, "192.168.1.10:0");
        assert_eq!(config.remote, "192.168.1.255:9");
    }

    #[test]
    fn test_absent_fields_take_defaults() {
        let config = CallbackConfig::from_json(r#"{"profile": "Main"}"#).unwrap();
        assert_eq!(config.profile, "Main");
        assert!(config.delay.is_zero());
        assert!(config.timeout.is_zero());
        assert_eq!(config.remote, DEFAULT_REMOTE);
        assert_eq!(config.iwconfig_path, PathBuf::from(DEFAULT_IWCONFIG));
        assert!(config.local.is_empty());
    }

    #[test]
    fn test_malformed_duration_is_rejected() {
        assert!(CallbackConfig::from_json(r#"{"wake-delay": "whenever"}"#).is_err());
        assert!(CallbackConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_template_defaults() {
        let template = CallbackConfig::template();
        assert_eq!(template.delay, DEFAULT_DELAY);
        assert_eq!(template.timeout, DEFAULT_TIMEOUT);
        assert_eq!(template.remote, DEFAULT_REMOTE);

        let json = serde_json::to_value(&template).unwrap();
        assert_eq!(json["wake-delay"], "20s");
        assert_eq!(json["wake-timeout"], "10m");
        assert!(json.get("logfile").is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backintime").join(CONFIG_FILE_NAME);

        let mut config = CallbackConfig::template();
        config.profile = "Main".into();
        config.timeout = HumanDuration::from_secs(150);
        config.save_to(&path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"2m30s\""));

        let loaded = CallbackConfig::load_from(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CallbackConfig::load_from(&dir.path().join("absent.json")).await.unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
