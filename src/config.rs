use crate::constants::SHUTDOWN_GRACE_SECS;
use crate::core_tls::{TlsConfig, TlsError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Tls(#[from] TlsError),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    pub listen_port: u16,
    pub pasv_address: String,
    pub chroot_dir: String,
    pub banner: Option<String>,
    pub idle_timeout_secs: u64,
    pub listener_timeout_ms: u64,
    pub shutdown_grace_secs: u64,
    pub passwd_file: Option<String>,
    pub allow_anonymous: bool,
    pub transfer_log: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: String::from("0.0.0.0"),
            listen_port: 21,
            pasv_address: String::from("0.0.0.0"),
            chroot_dir: String::from("/var/ftp"),
            banner: None,
            idle_timeout_secs: 300,
            listener_timeout_ms: 5000,
            shutdown_grace_secs: SHUTDOWN_GRACE_SECS,
            passwd_file: None,
            allow_anonymous: false,
            transfer_log: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionKind {
    AuditLog,
    DenyPattern,
    ReadOnly,
}

/// One `[[extensions]]` entry. Entries are installed in file order.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtensionConfig {
    pub name: String,
    pub kind: ExtensionKind,
    #[serde(default)]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tls: TlsConfig,
    #[serde(default)]
    pub extensions: Vec<ExtensionConfig>,
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&config_str)
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(config_str)?;
        Ok(config)
    }

    /// Startup checks that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.idle_timeout_secs == 0 {
            return Err(ConfigError::Invalid("idle_timeout_secs must be positive".into()));
        }
        if self.server.listener_timeout_ms == 0 {
            return Err(ConfigError::Invalid("listener_timeout_ms must be positive".into()));
        }

        self.tls.validate()?;

        let mut seen = HashSet::new();
        for ext in &self.extensions {
            if ext.name.trim().is_empty() {
                return Err(ConfigError::Invalid("extension name must not be empty".into()));
            }
            if !seen.insert(ext.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate extension name \"{}\"",
                    ext.name
                )));
            }
            if ext.kind == ExtensionKind::DenyPattern {
                let pattern = ext.pattern.as_deref().ok_or_else(|| {
                    ConfigError::Invalid(format!("extension \"{}\" needs a pattern", ext.name))
                })?;
                regex::Regex::new(pattern).map_err(|e| {
                    ConfigError::Invalid(format!("extension \"{}\": {}", ext.name, e))
                })?;
            }
        }
        Ok(())
    }
}
