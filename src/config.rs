//! Logger configuration

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FailurePolicy;
use crate::level::Level;

/// Extension of both the live log file and its dated archives
pub const LOG_EXTENSION: &str = ".log";

/// Logger configuration
///
/// The four core fields are taken verbatim by [`Config::new`]. Nothing is
/// validated: an empty directory or a threshold of [`Level::None`] on both
/// sinks is accepted and shows up later as an IO failure or as silence.
///
/// `directory` and `base_file_name` are read-only after construction so the
/// cached [`LogPaths`] can never go stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the live log file and its archives
    directory: String,

    /// File name without extension, e.g. "app" for "app.log"
    base_file_name: String,

    /// Minimum level written to the log file
    pub file_min_level: Level,

    /// Minimum level written to standard output
    pub console_min_level: Level,

    /// Append ":<line>" after the caller identifier (default: true)
    #[serde(default = "default_show_line")]
    pub show_line: bool,

    /// What to do when a log call fails (default: abort)
    #[serde(default)]
    pub on_failure: FailurePolicy,

    /// Delete dated archives older than this many days (default: keep all)
    #[serde(default)]
    pub retention_days: Option<u64>,

    #[serde(skip)]
    paths: OnceLock<LogPaths>,
}

fn default_show_line() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            logs_dir().to_string_lossy(),
            "daylog",
            Level::Info,
            Level::Debug,
        )
    }
}

impl Config {
    /// Create a configuration from its four core fields
    pub fn new(
        directory: impl Into<String>,
        base_file_name: impl Into<String>,
        file_min_level: Level,
        console_min_level: Level,
    ) -> Self {
        Self {
            directory: directory.into(),
            base_file_name: base_file_name.into(),
            file_min_level,
            console_min_level,
            show_line: default_show_line(),
            on_failure: FailurePolicy::default(),
            retention_days: None,
            paths: OnceLock::new(),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }

    pub fn with_show_line(mut self, show_line: bool) -> Self {
        self.show_line = show_line;
        self
    }

    pub fn with_retention_days(mut self, days: u64) -> Self {
        self.retention_days = Some(days);
        self
    }

    /// Load configuration from a TOML file
    ///
    /// A leading `~` in `directory` is expanded to the home directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config =
            toml::from_str(&content).context("Failed to parse config file")?;
        config.directory = shellexpand::tilde(&config.directory).into_owned();
        Ok(config)
    }

    /// Load configuration from the default location, or return default if not found
    pub fn load_or_default() -> Result<Self> {
        let path = config_file_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Directory as configured
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Base file name as configured
    pub fn base_file_name(&self) -> &str {
        &self.base_file_name
    }

    /// Normalized directory and base name, computed once on first use
    pub fn log_paths(&self) -> &LogPaths {
        self.paths
            .get_or_init(|| LogPaths::normalize(&self.directory, &self.base_file_name))
    }
}

/// Normalized location of the live log file and its archives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPaths {
    directory: String,
    base_file_name: String,
}

impl LogPaths {
    /// Ensure a trailing `/` on a non-empty directory and strip one leading
    /// `/` from the base name. Applying this twice changes nothing.
    pub fn normalize(directory: &str, base_file_name: &str) -> Self {
        let mut directory = directory.to_string();
        if !directory.is_empty() && !directory.ends_with('/') {
            directory.push('/');
        }
        let base_file_name = base_file_name
            .strip_prefix('/')
            .unwrap_or(base_file_name)
            .to_string();
        Self {
            directory,
            base_file_name,
        }
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn base_file_name(&self) -> &str {
        &self.base_file_name
    }

    /// Path of the live log file: `<dir><base>.log`
    pub fn live(&self) -> PathBuf {
        PathBuf::from(format!(
            "{}{}{}",
            self.directory, self.base_file_name, LOG_EXTENSION
        ))
    }

    /// File name of the archive for a given day: `<base>_YYYYMMDD.log`
    pub fn archive_file_name(&self, date: NaiveDate) -> String {
        format!(
            "{}_{}{}",
            self.base_file_name,
            date.format("%Y%m%d"),
            LOG_EXTENSION
        )
    }

    /// Path of the archive for a given day: `<dir><base>_YYYYMMDD.log`
    pub fn archive(&self, date: NaiveDate) -> PathBuf {
        PathBuf::from(format!(
            "{}{}",
            self.directory,
            self.archive_file_name(date)
        ))
    }
}

/// Get the base configuration directory (~/.daylog)
/// Falls back to ./.daylog if home directory cannot be determined
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".daylog"))
        .unwrap_or_else(|| {
            tracing::warn!(
                "Could not determine home directory, using current directory for config"
            );
            PathBuf::from(".daylog")
        })
}

/// Get the path to the config file
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the path to the default logs directory
pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}
