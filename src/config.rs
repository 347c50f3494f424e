//! Editor configuration module.
//!
//! Handles loading, validating, and merging `retouch.toml`. Stock defaults
//! are serialized to a TOML table and the user's file is merged on top of it
//! key by key, so a config file only needs the values it wants to change.
//!
//! ## Config File Location
//!
//! `retouch.toml` in the working directory is picked up automatically; any
//! other file can be given with `--config <path>`.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [history]
//! max_depth = 0             # Max undo snapshots kept, 0 = unlimited
//!
//! [defaults]
//! blur_intensity = 5        # Kernel size for `blur` without an argument (1-31)
//! edge_low = 100.0          # Hysteresis thresholds for `edges` without arguments
//! edge_high = 200.0
//!
//! [output]
//! jpeg_quality = 90         # JPEG encoding quality (1-100)
//!
//! [processing]
//! max_threads = 4           # Max worker threads (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{BlurIntensity, EdgeThresholds, OperatorDefaults, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "retouch.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Editor configuration loaded from `retouch.toml`.
///
/// All fields have sensible defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Undo history settings.
    pub history: HistoryConfig,
    /// Values for operators given without arguments.
    pub defaults: DefaultsConfig,
    /// Encoding settings.
    pub output: OutputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl EditorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        BlurIntensity::new(self.defaults.blur_intensity).map_err(|_| {
            ConfigError::Validation(format!(
                "defaults.blur_intensity must be {}-{}",
                BlurIntensity::MIN,
                BlurIntensity::MAX
            ))
        })?;
        EdgeThresholds::new(self.defaults.edge_low, self.defaults.edge_high).map_err(|_| {
            ConfigError::Validation(
                "defaults.edge_low and defaults.edge_high must be non-negative".into(),
            )
        })?;
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(ConfigError::Validation(
                "output.jpeg_quality must be 1-100".into(),
            ));
        }
        if self.processing.max_threads == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_threads must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Operator defaults from the `[defaults]` table. Falls back to the stock
    /// values for any field that fails validation.
    pub fn operator_defaults(&self) -> OperatorDefaults {
        OperatorDefaults {
            blur: BlurIntensity::new(self.defaults.blur_intensity).unwrap_or_default(),
            edges: EdgeThresholds::new(self.defaults.edge_low, self.defaults.edge_high)
                .unwrap_or_default(),
        }
    }

    pub fn jpeg_quality(&self) -> Quality {
        Quality::new(self.output.jpeg_quality)
    }
}

/// Undo history settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// Maximum number of snapshots kept. `0` keeps every snapshot for the
    /// whole session.
    pub max_depth: usize,
}

/// Values used by `blur` and `edges` when no argument is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    pub blur_intensity: u32,
    pub edge_low: f32,
    pub edge_high: f32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let edges = EdgeThresholds::default();
        Self {
            blur_intensity: BlurIntensity::default().value(),
            edge_low: edges.low(),
            edge_high: edges.high(),
        }
    }
}

/// Encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// JPEG encoding quality (1 = worst, 100 = best). PNG and BMP ignore it.
    pub jpeg_quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: Quality::default().value(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of worker threads for pixel operators.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_threads.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    // A struct of plain scalars always serializes; an empty table is the
    // harmless fallback.
    toml::Value::try_from(EditorConfig::default())
        .unwrap_or_else(|_| toml::Value::Table(toml::map::Map::new()))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<EditorConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: EditorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from an explicit file. A missing file is an error.
pub fn load_config_file(path: &Path) -> Result<EditorConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Load `retouch.toml` from `dir`, or the stock defaults if there is none.
pub fn load_config(dir: &Path) -> Result<EditorConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return resolve_config(None);
    }
    load_config_file(&path)
}

/// Returns a fully-commented stock `retouch.toml` with all keys and
/// explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# retouch configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Undo history
# ---------------------------------------------------------------------------
[history]
# Maximum number of snapshots kept for undo/redo. The oldest are dropped
# first. 0 keeps every snapshot for the whole session.
max_depth = 0

# ---------------------------------------------------------------------------
# Operator defaults
# ---------------------------------------------------------------------------
[defaults]
# Kernel size used by `blur` without an argument (1-31, even values are
# rounded up to the next odd size).
blur_intensity = 5

# Hysteresis thresholds used by `edges` without arguments.
edge_low = 100.0
edge_high = 200.0

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# JPEG encoding quality (1 = worst, 100 = best). PNG and BMP are lossless.
jpeg_quality = 90

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum worker threads for filters and resampling.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_threads = 4
"##
}
