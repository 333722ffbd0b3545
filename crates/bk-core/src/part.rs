//! Part instances and part kinds

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::transform::Transform;

/// A placed building part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartInstance {
    pub id: Uuid,
    /// Part type identifier (e.g. "CUBEROOM")
    pub type_id: String,
    /// Behavioral kind of the part
    pub kind: PartKind,
    /// Placement in world space
    pub world_transform: Transform,
}

impl PartInstance {
    /// Create a new instance at the origin
    pub fn new(type_id: impl Into<String>, kind: PartKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            type_id: type_id.into(),
            kind,
            world_transform: Transform::IDENTITY,
        }
    }

    /// Create a new instance, deriving its kind from the configuration
    pub fn classified(type_id: impl Into<String>, config: &EngineConfig) -> Self {
        let type_id = type_id.into();
        let kind = PartKind::classify(&type_id, config);
        Self::new(type_id, kind)
    }

    /// Set the world transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.world_transform = transform;
        self
    }
}

/// Part kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PartKind {
    /// Ordinary building part
    #[default]
    Static,
    /// Wire or pipe stretched between two controls
    Line,
    /// Wire endpoint control
    Control,
    /// Root control of a preset group
    Preset,
}

impl PartKind {
    /// Derive the kind of a part type. Presets are never derived from a type
    /// id; hosts tag preset roots explicitly.
    pub fn classify(type_id: &str, config: &EngineConfig) -> Self {
        if type_id == config.control_type_id {
            PartKind::Control
        } else if config.is_line_type(type_id) {
            PartKind::Line
        } else {
            PartKind::Static
        }
    }

    /// Controls and lines make up wire networks
    pub fn is_connector(&self) -> bool {
        matches!(self, PartKind::Line | PartKind::Control)
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            PartKind::Static => "Static",
            PartKind::Line => "Line",
            PartKind::Control => "Control",
            PartKind::Preset => "Preset",
        }
    }
}
