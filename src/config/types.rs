//! Core configuration types.
//! - Config holds runtime settings with sensible defaults.
//! - LogLevel represents verbosity with simple parsing helpers.

use anyhow::Result;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

use super::TEMP_PREFIX_DEFAULT;
use super::{paths, xml};

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Warnings and the final summary (default)
    #[default]
    Normal,
    /// Run summaries and batch progress
    Info,
    /// Per-entry detail
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" | "warn" | "warning" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration of the rename tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// Tag at the front of two-pass temporary names
    pub temp_prefix: String,
    /// Renames issued at once per batch; 0 means unlimited
    pub max_in_flight: usize,
    /// If true, check and print the plan but do not modify the filesystem
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Normal,
            log_file: None,
            temp_prefix: TEMP_PREFIX_DEFAULT.to_string(),
            max_in_flight: 0,
            dry_run: false,
        }
    }
}

impl Config {
    /// Defaults, overlaid with the config file when one exists.
    ///
    /// The file is taken from `BULK_RENAME_CONFIG` if set, else from the
    /// platform config directory. A missing file is not an error; a malformed
    /// one is.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();
        let Some(path) = paths::default_config_path() else {
            debug!("no config directory on this platform; using defaults");
            return Ok(cfg);
        };
        if !path.exists() {
            debug!(path = %path.display(), "config file not found; using defaults");
            return Ok(cfg);
        }
        xml::load_config_from_xml_path(&path)?.apply_to(&mut cfg);
        debug!(path = %path.display(), "config loaded");
        Ok(cfg)
    }
}
