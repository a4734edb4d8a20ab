//! Configuration management
//!
//! Loads the YAML file naming which controllers to open and on which ports.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::profile::Model;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub controllers: Vec<ControllerConfig>,
}

/// One controller and its MIDI ports
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControllerConfig {
    pub model: Model,
    /// Case-insensitive substring of the input port name
    pub input_port: String,
    /// Case-insensitive substring of the output port name
    pub output_port: String,
    /// Turn every LED off once connected
    #[serde(default = "default_true")]
    pub reset_on_start: bool,
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::from_yaml(&contents).with_context(|| format!("Invalid config file: {}", path))
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: AppConfig =
            serde_yaml::from_str(contents).context("Failed to parse YAML config")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.controllers.is_empty() {
            anyhow::bail!("At least one controller must be configured");
        }

        for (i, controller) in self.controllers.iter().enumerate() {
            if controller.input_port.trim().is_empty() {
                anyhow::bail!("Controller {} ({:?}) has an empty input_port", i, controller.model);
            }
            if controller.output_port.trim().is_empty() {
                anyhow::bail!("Controller {} ({:?}) has an empty output_port", i, controller.model);
            }
        }

        Ok(())
    }
}

fn default_true() -> bool {
    true
}
