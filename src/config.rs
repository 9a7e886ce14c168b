//! Environment-driven configuration.
//!
//! # Environment Variables
//!
//! - `CLAUDE_PROJECT_DIR`: project directory; its last path segment becomes
//!   the project id stamped on every record (default: `default-project`)
//! - `APPIQ_TRANSPORT`: `stdio` (default) or `http`
//! - `PORT`: HTTP port when serving over HTTP (default: 8080)

use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use crate::ledger::event_store::{DEFAULT_ACTIVITY_CAP, DEFAULT_DELEGATION_CAP};

/// Project id used when no project directory is configured.
pub const DEFAULT_PROJECT_ID: &str = "default-project";
/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

pub const PROJECT_DIR_ENV: &str = "CLAUDE_PROJECT_DIR";
pub const TRANSPORT_ENV: &str = "APPIQ_TRANSPORT";
pub const PORT_ENV: &str = "PORT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown transport '{0}' (expected 'stdio' or 'http')")]
    UnknownTransport(String),

    #[error("invalid port '{0}'")]
    InvalidPort(String),
}

// ---------------------------------------------------------------------------
// LedgerConfig
// ---------------------------------------------------------------------------

/// Settings injected into a [`Ledger`](crate::ledger::Ledger). Fixed for the
/// ledger's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub project_id: String,
    pub activity_cap: usize,
    pub delegation_cap: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_ID)
    }
}

impl LedgerConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            activity_cap: DEFAULT_ACTIVITY_CAP,
            delegation_cap: DEFAULT_DELEGATION_CAP,
        }
    }

    /// Builder: override the retention caps.
    pub fn with_caps(mut self, activity_cap: usize, delegation_cap: usize) -> Self {
        self.activity_cap = activity_cap;
        self.delegation_cap = delegation_cap;
        self
    }

    /// Read the project id from `CLAUDE_PROJECT_DIR`.
    pub fn from_env() -> Self {
        let dir = std::env::var(PROJECT_DIR_ENV).ok();
        Self::new(project_id_from_dir(dir.as_deref()))
    }
}

/// Last `/`-separated segment of `dir`, or [`DEFAULT_PROJECT_ID`] when the
/// directory is unset or ends in an empty segment.
pub fn project_id_from_dir(dir: Option<&str>) -> String {
    dir.and_then(|d| d.rsplit('/').next())
        .filter(|segment| !segment.is_empty())
        .unwrap_or(DEFAULT_PROJECT_ID)
        .to_string()
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    /// Newline-delimited JSON-RPC on stdin/stdout.
    #[default]
    Stdio,
    /// JSON-RPC over `POST /mcp`.
    Http,
}

impl FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stdio" => Ok(TransportKind::Stdio),
            "http" => Ok(TransportKind::Http),
            other => Err(ConfigError::UnknownTransport(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub transport: TransportKind,
    pub bind_addr: SocketAddr,
    pub ledger: LedgerConfig,
}

impl ServerConfig {
    /// Build from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let transport = match lookup(TRANSPORT_ENV) {
            Some(value) => value.parse()?,
            None => TransportKind::default(),
        };

        let port = match lookup(PORT_ENV) {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(value))?,
            None => DEFAULT_PORT,
        };

        let project_dir = lookup(PROJECT_DIR_ENV);
        Ok(Self {
            transport,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            ledger: LedgerConfig::new(project_id_from_dir(project_dir.as_deref())),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_project_id_from_dir() {
        assert_eq!(project_id_from_dir(Some("/home/dev/shop-app")), "shop-app");
        assert_eq!(project_id_from_dir(Some("shop-app")), "shop-app");
        assert_eq!(project_id_from_dir(Some("/home/dev/")), DEFAULT_PROJECT_ID);
        assert_eq!(project_id_from_dir(Some("")), DEFAULT_PROJECT_ID);
        assert_eq!(project_id_from_dir(None), DEFAULT_PROJECT_ID);
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config.transport, TransportKind::Stdio);
        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
        assert_eq!(config.ledger, LedgerConfig::default());
        assert_eq!(config.ledger.activity_cap, 100);
        assert_eq!(config.ledger.delegation_cap, 50);
    }

    #[test]
    fn test_server_config_from_vars() {
        let config = ServerConfig::from_vars(vars(&[
            ("APPIQ_TRANSPORT", "HTTP"),
            ("PORT", "9090"),
            ("CLAUDE_PROJECT_DIR", "/work/flutter-shop"),
        ]))
        .unwrap();
        assert_eq!(config.transport, TransportKind::Http);
        assert_eq!(config.bind_addr.port(), 9090);
        assert_eq!(config.ledger.project_id, "flutter-shop");
    }

    #[test]
    fn test_server_config_errors() {
        assert_eq!(
            ServerConfig::from_vars(vars(&[("APPIQ_TRANSPORT", "carrier-pigeon")])).unwrap_err(),
            ConfigError::UnknownTransport("carrier-pigeon".into())
        );
        assert_eq!(
            ServerConfig::from_vars(vars(&[("PORT", "eighty")])).unwrap_err(),
            ConfigError::InvalidPort("eighty".into())
        );
    }
}
