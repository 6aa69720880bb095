//! Renderer configuration persistence
//!
//! Stores user preferences in `~/.config/chatmark/config.yaml`

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::highlight::PipelineConfig;

/// Settings that persist across runs. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Render with the dark theme
    #[serde(default = "default_dark")]
    pub dark: bool,

    /// Theme id used in dark mode (e.g. "default-dark", "github-dark")
    #[serde(default = "default_dark_theme")]
    pub dark_theme: String,

    /// Theme id used in light mode
    #[serde(default = "default_light_theme")]
    pub light_theme: String,

    /// Pause between highlight work items, in milliseconds
    #[serde(default = "default_worker_yield_ms")]
    pub worker_yield_ms: u64,
}

fn default_dark() -> bool {
    true
}

fn default_dark_theme() -> String {
    "default-dark".to_string()
}

fn default_light_theme() -> String {
    "default-light".to_string()
}

fn default_worker_yield_ms() -> u64 {
    1
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dark: default_dark(),
            dark_theme: default_dark_theme(),
            light_theme: default_light_theme(),
            worker_yield_ms: default_worker_yield_ms(),
        }
    }
}

impl RenderConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        Self::load_from(&path).unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            Self::default()
        })
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
        let config = serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse config at {}: {}", path.display(), e))?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    /// Save config to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Theme id for the active mode
    pub fn theme_id(&self) -> &str {
        if self.dark {
            &self.dark_theme
        } else {
            &self.light_theme
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            worker_yield: Duration::from_millis(self.worker_yield_ms),
        }
    }
}
