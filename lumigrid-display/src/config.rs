//! Configuration for the display node.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use lumigrid_core::{FrameServerConfig, Rgb};

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Network settings.
    pub network: NetworkConfig,
    /// Expected frame shape.
    pub matrix: MatrixConfig,
    /// Loop timing bounds.
    pub timeouts: TimeoutConfig,
    /// Cell colors.
    pub render: RenderConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Interface to listen on.
    pub listen_host: String,
    /// Port to listen on, must match the sender.
    pub listen_port: u16,
}

/// Expected frame shape; frames of any other shape are discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    pub rows: usize,
    pub cols: usize,
}

/// Loop timing bounds, all in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Bound on waiting for a connection each tick (sets the minimum
    /// render cadence).
    pub accept_ms: u64,
    /// Bound on each read of an accepted connection.
    pub receive_ms: u64,
    /// Bound on draining a mis-dimensioned frame.
    pub drain_ms: u64,
    /// Pause after an unclassified tick error.
    pub backoff_ms: u64,
}

/// Cell colors as `[r, g, b]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub lit: [u8; 3],
    pub unlit: [u8; 3],
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            matrix: MatrixConfig::default(),
            timeouts: TimeoutConfig::default(),
            render: RenderConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_host: "0.0.0.0".into(),
            listen_port: 8888,
        }
    }
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self { rows: 32, cols: 32 }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            accept_ms: 1000,
            receive_ms: 5000,
            drain_ms: 100,
            backoff_ms: 100,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            lit: [255, 255, 255],
            unlit: [0, 0, 0],
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

impl DisplayConfig {
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

    /// Convert to the core server configuration.
    pub fn to_server_config(&self) -> FrameServerConfig {
        let [lr, lg, lb] = self.render.lit;
        let [ur, ug, ub] = self.render.unlit;
        FrameServerConfig {
            listen_addr: format!("{}:{}", self.network.listen_host, self.network.listen_port),
            rows: self.matrix.rows,
            cols: self.matrix.cols,
            accept_timeout: Duration::from_millis(self.timeouts.accept_ms),
            receive_timeout: Duration::from_millis(self.timeouts.receive_ms),
            drain_timeout: Duration::from_millis(self.timeouts.drain_ms),
            error_backoff: Duration::from_millis(self.timeouts.backoff_ms),
            lit: Rgb::new(lr, lg, lb),
            unlit: Rgb::new(ur, ug, ub),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
