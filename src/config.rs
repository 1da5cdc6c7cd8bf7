//! Runtime configuration.
//!
//! Values come from built-in defaults, then an optional YAML file named by
//! `HEALTHD_CONFIG`, then the `PORT` and `BIND_ADDR` environment variables.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

pub const CONFIG_PATH_ENV: &str = "HEALTHD_CONFIG";
pub const PORT_ENV: &str = "PORT";
pub const BIND_ADDR_ENV: &str = "BIND_ADDR";

/// Upper bound on a buffered request (head plus body).
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    pub max_request_bytes: usize,
    /// Serve the `/hello` greeting route.
    pub hello_route: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            hello_route: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

impl Config {
    /// Loads the configuration from every source in order.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        cfg.apply_env()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    fn apply_env(&mut self) -> anyhow::Result<()> {
        if let Ok(port) = std::env::var(PORT_ENV) {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("{PORT_ENV} is not a valid port: {port:?}"))?;
        }
        if let Ok(addr) = std::env::var(BIND_ADDR_ENV) {
            self.server.bind_addr = addr;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg = Config::from_yaml_str("server:\n  port: 9000\n").unwrap();

        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.bind_addr, "0.0.0.0");
        assert_eq!(cfg.server.max_request_bytes, DEFAULT_MAX_REQUEST_BYTES);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn empty_yaml_is_default() {
        let cfg = Config::from_yaml_str("  \n").unwrap();
        assert_eq!(cfg.server.listen_addr(), "0.0.0.0:8080");
    }
}
