//! Persistent bridge configuration (loaded with confy)

use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_NAME: &str = "pushapp";

/// Errors during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] confy::ConfyError),

    #[error("failed to save configuration")]
    Save(#[source] confy::ConfyError),
}

/// How overlay elements are created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlaySettings {
    /// Stacking order for overlay elements; above regular content
    #[serde(default = "default_z_index")]
    pub z_index: f32,
    /// Placeholders let touches through to the content underneath
    #[serde(default = "default_true")]
    pub click_through: bool,
    /// Bound on pending UI-context commands before callers wait to enqueue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_z_index() -> f32 {
    1000.0
}

fn default_true() -> bool {
    true
}

fn default_queue_capacity() -> usize {
    32
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            z_index: default_z_index(),
            click_through: true,
            queue_capacity: default_queue_capacity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// `tenant$channel` identifier the shell initializes the SDK with
    #[serde(default)]
    pub identifier: String,
    /// Sandbox flag the shell initializes the SDK with
    #[serde(default)]
    pub sandbox: bool,
    #[serde(default)]
    pub overlay: OverlaySettings,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            identifier: String::new(),
            sandbox: false,
            overlay: OverlaySettings::default(),
        }
    }
}

impl BridgeConfig {
    /// Load from the platform config dir, falling back to defaults
    pub fn load() -> Self {
        Self::try_load().unwrap_or_default()
    }

    pub fn try_load() -> Result<Self, ConfigError> {
        Ok(confy::load(APP_NAME, None)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, None, self).map_err(ConfigError::Save)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_defaults() {
        let settings = OverlaySettings::default();
        assert_eq!(settings.z_index, 1000.0);
        assert!(settings.click_through);
        assert_eq!(settings.queue_capacity, 32);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: BridgeConfig = serde_json::from_str(r#"{"identifier":"acme$web"}"#).unwrap();
        assert_eq!(config.identifier, "acme$web");
        assert!(!config.sandbox);
        assert_eq!(config.overlay, OverlaySettings::default());

        let config: BridgeConfig =
            serde_json::from_str(r#"{"overlay":{"z_index":5.0}}"#).unwrap();
        assert_eq!(config.overlay.z_index, 5.0);
        assert_eq!(config.overlay.queue_capacity, 32);
    }
}
