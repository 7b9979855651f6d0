//! Client configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level configuration for the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Render server address.
    pub network: NetworkConfig,
    /// Window geometry handed to the UI toolkit.
    pub window: WindowConfig,
    /// Control panel contents.
    pub controls: ControlsConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

/// Network settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Host to connect to.
    pub host: String,
    /// Port to connect on.
    pub port: u16,
    /// Connection timeout in milliseconds.
    pub timeout_ms: u64,
}

/// Window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Main window width in pixels.
    pub width: u32,
    /// Main window height in pixels.
    pub height: u32,
}

/// Control panel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Render devices offered in the device chooser.
    pub devices: Vec<String>,
    /// JSON file mapping menu names to model paths on the remote.
    /// Empty disables model selection.
    pub nif_paths: String,
    /// Default destination for `save`.
    pub save_path: String,
}

/// Logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error, off.
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 3000,
            timeout_ms: 5000,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1320,
            height: 800,
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            devices: rui_core::controls::DEFAULT_DEVICES
                .iter()
                .map(|d| d.to_string())
                .collect(),
            nif_paths: String::new(),
            save_path: "frame.pfm".into(),
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

impl ClientConfig {
    /// Load from a TOML file, falling back to defaults.
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
}

// ── Tests ────────────────────────────────────────────────────────
