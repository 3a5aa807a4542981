//! Dashboard settings. Defaults are the values the dashboard was built
//! around; a YAML file and command line flags may override them.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::emulator::{FailurePolicy, Schedule};
use crate::relay::Capacity;
use crate::topics::TopicSet;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub client_id: String,
    pub keep_alive_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        BrokerConfig {
            host: "localhost".to_string(),
            port: 1883,
            username: String::new(),
            password: String::new(),
            client_id: format!("sensordash-{}", std::process::id()),
            keep_alive_secs: 60,
            connect_timeout_secs: 10,
        }
    }
}

impl BrokerConfig {
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    /// Credentials are only sent when a username is configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.username.is_empty() {
            None
        } else {
            Some((&self.username, &self.password))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashConfig {
    pub broker: BrokerConfig,
    /// Per-device base path; sensor and command topics hang off it.
    pub base_topic: String,
    pub publish_gap_ms: u64,
    pub cycle_secs: u64,
    pub tick_ms: u64,
    /// `None` keeps the relay unbounded.
    pub relay_bound: Option<usize>,
    pub on_publish_error: FailurePolicy,
    pub log_file: PathBuf,
}

impl Default for DashConfig {
    fn default() -> Self {
        DashConfig {
            broker: BrokerConfig::default(),
            base_topic: "users/0/devices/emulator".to_string(),
            publish_gap_ms: 100,
            cycle_secs: 30,
            tick_ms: 100,
            relay_bound: None,
            on_publish_error: FailurePolicy::default(),
            log_file: PathBuf::from("sensor-dash.log"),
        }
    }
}

impl DashConfig {
    pub fn from_yaml_str(text: &str, path: &Path) -> Result<DashConfig, ConfigError> {
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<DashConfig, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        DashConfig::from_yaml_str(&text, path)
    }

    pub fn topics(&self) -> TopicSet {
        TopicSet::from_base(&self.base_topic)
    }

    pub fn schedule(&self) -> Schedule {
        Schedule {
            between: Duration::from_millis(self.publish_gap_ms),
            cycle: Duration::from_secs(self.cycle_secs),
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn relay_capacity(&self) -> Capacity {
        Capacity::from(self.relay_bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_timing() {
        let cfg = DashConfig::default();
        assert_eq!(cfg.schedule().between, Duration::from_millis(100));
        assert_eq!(cfg.schedule().cycle, Duration::from_secs(30));
        assert_eq!(cfg.tick(), Duration::from_millis(100));
        assert_eq!(cfg.broker.port, 1883);
        assert_eq!(cfg.broker.keep_alive(), Duration::from_secs(60));
        assert_eq!(cfg.relay_capacity(), Capacity::Unbounded);
        assert_eq!(cfg.on_publish_error, FailurePolicy::LogAndContinue);
    }

    #[test]
    fn yaml_overrides_only_given_fields() {
        let yaml = "\
broker:
  host: mqtt.example.net
  username: dev_42
  password: secret
base_topic: users/9/devices/42
relay_bound: 64
on_publish_error: stop
";
        let cfg = DashConfig::from_yaml_str(yaml, Path::new("dash.yaml")).unwrap();
        assert_eq!(cfg.broker.host, "mqtt.example.net");
        assert_eq!(cfg.broker.port, 1883);
        assert_eq!(cfg.broker.credentials(), Some(("dev_42", "secret")));
        assert_eq!(cfg.topics().light(), "users/9/devices/42/light");
        assert_eq!(cfg.relay_capacity(), Capacity::DropOldest(64));
        assert_eq!(cfg.on_publish_error, FailurePolicy::Stop);
        assert_eq!(cfg.tick_ms, 100);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = DashConfig::from_yaml_str("colour: red\n", Path::new("x.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn no_username_means_anonymous() {
        assert_eq!(BrokerConfig::default().credentials(), None);
    }
}
