use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use sensordash::config::ConfigError;
use sensordash::emulator::FailurePolicy;
use sensordash::DashConfig;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone, Default)]
pub struct DashOpts {
    /// YAML settings file; flags given here override it
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Broker host name or address
    #[arg(short = 'H', long = "host")]
    pub host: Option<String>,

    /// Broker TCP port
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Broker login
    #[arg(short = 'u', long = "username")]
    pub username: Option<String>,

    /// Broker password
    #[arg(short = 'P', long = "password")]
    pub password: Option<String>,

    /// Device base topic, e.g. users/<id>/devices/<code>
    #[arg(short = 'b', long = "base")]
    pub base_topic: Option<String>,

    /// Keep at most this many undrawn events per direction
    #[arg(long = "relay-bound", value_name = "N")]
    pub relay_bound: Option<usize>,

    /// Stop publishing after the first failed publish instead of skipping it
    #[arg(long = "stop-on-error")]
    pub stop_on_error: bool,

    /// Where to write the log (the terminal is taken by the dashboard)
    #[arg(short = 'l', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl DashOpts {
    /// Defaults, then the config file if any, then flags.
    pub fn resolve(&self) -> Result<DashConfig, ConfigError> {
        let base = match &self.config {
            Some(path) => DashConfig::load(path)?,
            None => DashConfig::default(),
        };
        Ok(self.apply(base))
    }

    pub fn apply(&self, mut cfg: DashConfig) -> DashConfig {
        if let Some(host) = &self.host {
            cfg.broker.host = host.clone();
        }
        if let Some(port) = self.port {
            cfg.broker.port = port;
        }
        if let Some(username) = &self.username {
            cfg.broker.username = username.clone();
        }
        if let Some(password) = &self.password {
            cfg.broker.password = password.clone();
        }
        if let Some(base) = &self.base_topic {
            cfg.base_topic = base.clone();
        }
        if self.relay_bound.is_some() {
            cfg.relay_bound = self.relay_bound;
        }
        if self.stop_on_error {
            cfg.on_publish_error = FailurePolicy::Stop;
        }
        if let Some(log_file) = &self.log_file {
            cfg.log_file = log_file.clone();
        }
        cfg
    }
}

/// Sends `tracing` output to `path`, appending, with `RUST_LOG` filtering
/// (default `info`) and local `%T%.3f` timestamps.
pub fn init_logging(path: &Path) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::new("%T%.3f".to_string()))
        .with_ansi(false)
        .with_thread_names(true)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}
