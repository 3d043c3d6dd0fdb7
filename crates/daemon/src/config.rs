// Local configuration for the review server.
//
// Global config: `~/.marginalia/config.toml`
// Precedence: built-in defaults < config file < command-line flags.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persist::debounce::DebounceConfig;

/// Root directory for marginalia global state: `~/.marginalia/`.
pub fn global_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".marginalia"))
}

/// Path to the global config file: `~/.marginalia/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    global_dir().map(|d| d.join("config.toml"))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Interface the HTTP server binds to.
    pub host: String,
    /// TCP port; 0 picks any free port.
    pub port: u16,
    /// Quiescence window before comments are flushed to disk.
    pub debounce_ms: u64,
    /// Watch the source file for external edits.
    pub watch: bool,
    /// Where artifacts are written (defaults to the source file's directory).
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            debounce_ms: 200,
            watch: true,
            output_dir: None,
        }
    }
}

impl Config {
    /// Load from `~/.marginalia/config.toml`. Returns defaults if the file
    /// doesn't exist; a file that exists but can't be parsed is an error.
    pub fn load() -> Result<Self, ConfigError> {
        match global_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Layer command-line flags on top of the loaded values.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(debounce_ms) = overrides.debounce_ms {
            self.debounce_ms = debounce_ms;
        }
        if overrides.no_watch {
            self.watch = false;
        }
        if overrides.output_dir.is_some() {
            self.output_dir = overrides.output_dir;
        }
        self
    }

    /// Debounce window, clamped to the supported range.
    pub fn debounce(&self) -> DebounceConfig {
        DebounceConfig::with_millis(self.debounce_ms)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Values supplied on the command line; `None` leaves the loaded value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debounce_ms: Option<u64>,
    pub no_watch: bool,
    pub output_dir: Option<PathBuf>,
}

// ── Errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error at {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("config parse error in {}: {source}", path.display())]
    Parse { path: PathBuf, source: toml::de::Error },
}
