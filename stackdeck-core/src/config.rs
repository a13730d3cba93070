use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::Timings;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "STACKDECK_CONFIG";

/// The short foreign command that reports router health.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct RouterProbe {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for RouterProbe {
    fn default() -> Self {
        Self {
            program: "docker".into(),
            args: vec![
                "inspect".into(),
                "--format".into(),
                "{{.State.Health.Status}}".into(),
                "ddev-router".into(),
            ],
        }
    }
}

/// Root configuration file structure
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Orchestration executable
    pub tool: String,

    /// Environment marker set to `true` on every invocation so the tool
    /// skips its own interactive front end
    pub no_tui_env: String,

    /// Periodic refresh in milliseconds
    pub refresh_interval_ms: u64,

    /// Delay before leaving a successful operation, in milliseconds
    pub auto_return_delay_ms: u64,

    pub router: RouterProbe,

    /// Render without colors
    pub simple_formatting: bool,

    /// Log file; defaults to the user cache directory
    pub log_file: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tool: "ddev".into(),
            no_tui_env: "DDEV_NO_TUI".into(),
            refresh_interval_ms: 5000,
            auto_return_delay_ms: 2000,
            router: RouterProbe::default(),
            simple_formatting: false,
            log_file: None,
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
    #[error("{field} must be greater than zero")]
    ZeroInterval { field: &'static str },
}

impl DashboardConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Load configuration from a string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        // An empty file is a valid "all defaults" config.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: DashboardConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Locate and load the config.
    ///
    /// An explicit path must exist. The env path and the default path are
    /// skipped when missing, and with nothing found the defaults apply.
    pub fn discover(
        explicit: Option<&Path>,
        default_path: Option<&Path>,
    ) -> Result<(Option<PathBuf>, Self), ConfigError> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::discover_in(explicit, from_env.as_deref(), default_path)
    }

    fn discover_in(
        explicit: Option<&Path>,
        from_env: Option<&Path>,
        default_path: Option<&Path>,
    ) -> Result<(Option<PathBuf>, Self), ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Ok((Some(path.to_path_buf()), Self::load(path)?));
        }

        for path in [from_env, default_path].into_iter().flatten() {
            if path.exists() {
                return Ok((Some(path.to_path_buf()), Self::load(path)?));
            }
        }

        Ok((None, Self::default()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "refresh_interval_ms",
            });
        }
        Ok(())
    }

    pub fn timings(&self) -> Timings {
        Timings {
            refresh_interval: Duration::from_millis(self.refresh_interval_ms),
            auto_return_delay: Duration::from_millis(self.auto_return_delay_ms),
        }
    }
}
