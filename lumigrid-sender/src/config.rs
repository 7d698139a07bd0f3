//! Configuration for the sender.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// Where frames go.
    pub target: TargetConfig,
    /// Transform pipeline parameters.
    pub encoder: EncoderConfig,
    /// Capture cadence and source resolution.
    pub capture: CaptureConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Destination display node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Display node hostname or IP.
    pub host: String,
    /// Display node port.
    pub port: u16,
    /// Connect/write timeout in milliseconds.
    pub io_timeout_ms: u64,
}

/// Transform pipeline parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Percentile rank for binarization (0..=1). Depth samples
    /// strictly above this percentile of the frame become ON.
    pub keep_fraction: f64,
    /// Minimum ON-fraction of a source block to light its target
    /// cell (0..=1). Higher biases towards fewer lit pixels.
    pub on_threshold: f64,
    /// Display grid height.
    pub target_rows: usize,
    /// Display grid width.
    pub target_cols: usize,
}

/// Capture settings for the synthetic depth source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Frames captured per second.
    pub fps: u8,
    /// Source field height before downscaling.
    pub source_rows: usize,
    /// Source field width before downscaling.
    pub source_cols: usize,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            encoder: EncoderConfig::default(),
            capture: CaptureConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8888,
            io_timeout_ms: 1000,
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            // Keep the nearest 35% of the scene: ON above the 65th
            // percentile of depth.
            keep_fraction: 0.65,
            on_threshold: 0.75,
            target_rows: 32,
            target_cols: 32,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fps: 10,
            source_rows: 240,
            source_cols: 320,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl SenderConfig {
    /// Load configuration from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// The `host:port` string the sender dials.
    pub fn target_addr(&self) -> String {
        format!("{}:{}", self.target.host, self.target.port)
    }
}

// ── Tests ────────────────────────────────────────────────────────
