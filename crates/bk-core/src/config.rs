//! Engine configuration
//!
//! Settings that tune connectivity queries and part classification. They can
//! be serialized and loaded from RON configuration files.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CONNECT_EPSILON, DEFAULT_CONTROL_TYPE_ID, DEFAULT_LINE_TYPE_IDS, DEFAULT_POWER_FILTER,
};

/// Snapping engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum snap-point distance that counts as connected (world units)
    pub connect_epsilon: f64,
    /// Type id of wire control points
    pub control_type_id: String,
    /// Type ids of line parts (wires, pipes) stretched between controls
    pub line_type_ids: Vec<String>,
    /// Snap-point name filter used for wire queries and floating detection
    pub power_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            connect_epsilon: CONNECT_EPSILON,
            control_type_id: DEFAULT_CONTROL_TYPE_ID.to_string(),
            line_type_ids: DEFAULT_LINE_TYPE_IDS.iter().map(|s| s.to_string()).collect(),
            power_filter: DEFAULT_POWER_FILTER.to_string(),
        }
    }
}

impl EngineConfig {
    /// Check whether a type id names a line part
    pub fn is_line_type(&self, type_id: &str) -> bool {
        self.line_type_ids.iter().any(|id| id == type_id)
    }

    /// Load configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Parse configuration from RON text
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        if !(config.connect_epsilon.is_finite() && config.connect_epsilon > 0.0) {
            return Err(ConfigError::InvalidEpsilon(config.connect_epsilon));
        }
        Ok(config)
    }

    /// Save configuration to a RON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }
}

/// Configuration-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Connect epsilon must be a positive distance, got {0}")]
    InvalidEpsilon(f64),
}
