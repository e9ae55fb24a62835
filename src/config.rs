//! Configuration file support
//!
//! Loads settings from ~/.logmark.toml (or %USERPROFILE%\.logmark.toml on Windows)
//!
//! Example:
//! ```text
//! # logmark configuration
//! default-color = "#ff0000"
//! line-prefix = "line-number"
//! show-line-numbers = true
//! tab-width = 4
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::highlight::{Color, EngineOptions, LinePrefix};

/// Configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Color offered when adding a rule
    pub default_color: Color,
    /// Tag for lines in the highlighted-only view
    pub line_prefix: LinePrefix,
    /// Whether to show line numbers
    pub show_line_numbers: bool,
    /// Tab width for display
    pub tab_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_color: Color::Rgb(0xff, 0, 0),
            line_prefix: LinePrefix::LineNumber,
            show_line_numbers: false,
            tab_width: 8,
        }
    }
}

impl Config {
    /// Home directory (USERPROFILE on Windows)
    fn home_dir() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE").ok().map(PathBuf::from)
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME").ok().map(PathBuf::from)
        }
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::home_dir().map(|home| home.join(".logmark.toml"))
    }

    /// Default log file, used when `--log-file` is not given
    pub fn log_path() -> Option<PathBuf> {
        Self::home_dir().map(|home| home.join(".logmark").join("logmark.log"))
    }

    /// Load configuration, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring config file");
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse config file contents
    fn parse(contents: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(contents)?;
        config.tab_width = config.tab_width.clamp(1, 16);
        Ok(config)
    }

    /// Engine settings derived from this config
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            line_prefix: self.line_prefix,
        }
    }
}
