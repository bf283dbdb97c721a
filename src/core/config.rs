use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    /// Seconds clients should wait between announces
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Maximum number of peers returned per announce
    #[serde(default = "default_peer_limit")]
    pub peer_limit: usize,
    /// Header set by a trusted reverse proxy carrying the client address.
    /// Leave unset when clients connect directly, or they could spoof it.
    pub real_ip_header: Option<String>,
    #[serde(default)]
    pub failure_mode: FailureMode,
}

/// What an announce that failed sends back to the client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// `d14:failure reason<len>:<message>e`
    #[default]
    Bencode,
    /// The bare string `error`
    Legacy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Seconds between expired-peer sweeps
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    /// Required on `/metrics` when set
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_console")]
    pub console: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            peer_limit: default_peer_limit(),
            real_ip_header: None,
            failure_mode: FailureMode::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: default_cleanup_interval(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            console: default_console(),
        }
    }
}

// Default value functions
fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_interval() -> u32 {
    3600 // 1 hour
}

fn default_peer_limit() -> usize {
    100
}

fn default_cleanup_interval() -> u64 {
    300 // 5 minutes
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_console() -> bool {
    false
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("Server port must be greater than 0");
        }

        if self.server.num_threads == 0 {
            bail!("num_threads must be greater than 0");
        }

        if self.tracker.interval == 0 {
            bail!("interval must be greater than 0");
        }

        if self.tracker.peer_limit == 0 {
            bail!("peer_limit must be greater than 0");
        }

        if let Some(header) = &self.tracker.real_ip_header {
            if axum::http::HeaderName::from_bytes(header.as_bytes()).is_err() {
                bail!("real_ip_header '{}' is not a valid header name", header);
            }
        }

        if self.storage.cleanup_interval == 0 {
            bail!("cleanup_interval must be greater than 0");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_example_config_is_valid() {
        let config = Config::parse(include_str!("../../config.example.toml"))
            .expect("example config must load");

        assert_eq!(config.server.port, 6969);
        assert_eq!(config.tracker.interval, 3600);
        assert_eq!(config.tracker.peer_limit, 100);
        assert_eq!(config.tracker.real_ip_header.as_deref(), Some("X-Real-IP"));
        assert_eq!(config.tracker.failure_mode, FailureMode::Bencode);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::parse("[server]\nport = 8080\n").unwrap();

        assert_eq!(config.server.bind_address, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.tracker.interval, 3600);
        assert_eq!(config.tracker.peer_limit, 100);
        assert_eq!(config.tracker.real_ip_header, None);
        assert_eq!(config.tracker.failure_mode, FailureMode::Bencode);
        assert_eq!(config.storage.cleanup_interval, 300);
        assert_eq!(config.metrics.api_key, None);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_legacy_failure_mode() {
        let config = Config::parse("[server]\nport = 8080\n[tracker]\nfailure_mode = \"legacy\"\n").unwrap();
        assert_eq!(config.tracker.failure_mode, FailureMode::Legacy);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Config::parse("[server]\nport = 0\n").is_err());
        assert!(Config::parse("[server]\nport = 1\n[tracker]\ninterval = 0\n").is_err());
        assert!(Config::parse("[server]\nport = 1\n[tracker]\nfailure_mode = \"html\"\n").is_err());
        assert!(Config::parse("[server]\nport = 1\n[tracker]\nreal_ip_header = \"bad header\"\n").is_err());
        assert!(Config::parse("[server]\nport = 1\n[logging]\nlevel = \"loud\"\n").is_err());
        assert!(Config::parse("[tracker]\ninterval = 10\n").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 7000\n[storage]\ncleanup_interval = 60").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.storage.cleanup_interval, 60);
    }

    #[test]
    fn test_from_missing_file() {
        assert!(Config::from_file(Path::new("/nonexistent/seeder.toml")).is_err());
    }
}
