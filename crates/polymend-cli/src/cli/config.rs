//! Configuration file loading for polymend.
//!
//! Discovers and loads `polymend.yaml` from the working directory (or an
//! explicit `--config` path) and merges it with CLI arguments. CLI
//! arguments take precedence.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use polymend::{CleanConfig, Decision};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "polymend.yaml";

/// Largest precision that still fits in an f64 mantissa.
pub const MAX_PRECISION: u32 = 15;

/// Top-level configuration from polymend.yaml.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Decimal digits used for vertex equality.
    pub precision: Option<u32>,

    /// Minimum closed-ring length.
    pub min_ring_points: Option<usize>,

    /// Non-interactive answer to the repair prompt.
    pub decision: Option<Decision>,

    /// Pretty-print GeoJSON output.
    pub pretty: Option<bool>,
}

/// Look for `polymend.yaml` in `dir`.
pub fn discover_config(dir: &Path) -> Option<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path.display());
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path.display());
        None
    }
}

/// Load and parse a config file.
pub fn load_config(path: &Path) -> anyhow::Result<FileConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path.display()))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<FileConfig> {
    // an empty YAML document deserializes as unit, not as a map
    if contents.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    let config: FileConfig = serde_yaml::from_str(contents).context("invalid YAML")?;
    Ok(config)
}

/// Load the explicit config if given, else discover one in `dir`.
pub fn load_or_default(explicit: Option<&Path>, dir: &Path) -> anyhow::Result<FileConfig> {
    match explicit {
        Some(path) => load_config(path),
        None => match discover_config(dir) {
            Some(path) => load_config(&path),
            None => Ok(FileConfig::default()),
        },
    }
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub clean: CleanConfig,
    /// `None` means "ask the operator"
    pub decision: Option<Decision>,
    pub pretty: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            clean: CleanConfig::default(),
            decision: None,
            pretty: true,
        }
    }
}

/// Builder for merging the config file with CLI arguments.
pub struct ConfigMerger {
    config: FileConfig,
}

impl ConfigMerger {
    pub fn new(config: FileConfig) -> Self {
        Self { config }
    }

    /// Merge with `repair` arguments; any `Some` CLI value wins.
    pub fn merge_repair_args(
        self,
        precision: Option<u32>,
        min_ring_points: Option<usize>,
        decision: Option<Decision>,
        compact: bool,
    ) -> anyhow::Result<Settings> {
        let defaults = Settings::default();
        let precision = precision
            .or(self.config.precision)
            .unwrap_or(defaults.clean.precision);
        let min_ring_points = min_ring_points
            .or(self.config.min_ring_points)
            .unwrap_or(defaults.clean.min_ring_points);

        if precision > MAX_PRECISION {
            bail!("precision must be at most {}, got {}", MAX_PRECISION, precision);
        }
        if min_ring_points < 3 {
            bail!("min_ring_points must be at least 3, got {}", min_ring_points);
        }

        Ok(Settings {
            clean: CleanConfig {
                precision,
                min_ring_points,
            },
            decision: decision.or(self.config.decision),
            pretty: !compact && self.config.pretty.unwrap_or(defaults.pretty),
        })
    }
}
