//! Scene of placed part instances and its file serialization

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::part::PartInstance;
use crate::snap::SnapStateCache;

/// Access to the live part instances of a host
pub trait InstanceSource {
    /// Get an instance by id
    fn instance(&self, id: Uuid) -> Option<&PartInstance>;

    /// Get a mutable instance by id
    fn instance_mut(&mut self, id: Uuid) -> Option<&mut PartInstance>;

    /// Iterate over all live instances
    fn instances(&self) -> Box<dyn Iterator<Item = &PartInstance> + '_>;
}

/// Serialization format (parts in placement order)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SceneData {
    version: u32,
    name: String,
    parts: Vec<PartInstance>,
    #[serde(default)]
    snap_state: SnapStateCache,
}

/// A set of placed parts, iterated in placement order
#[derive(Debug, Clone)]
pub struct Scene {
    /// File format version
    pub version: u32,
    /// Scene name
    pub name: String,
    /// All parts (keyed by ID for O(1) lookup)
    parts: HashMap<Uuid, PartInstance>,
    /// Placement order
    order: Vec<Uuid>,
    /// Snap memory saved alongside the parts
    snap_state: SnapStateCache,
}

impl From<Scene> for SceneData {
    fn from(scene: Scene) -> Self {
        let Scene {
            version,
            name,
            mut parts,
            order,
            snap_state,
        } = scene;
        Self {
            version,
            name,
            parts: order.iter().filter_map(|id| parts.remove(id)).collect(),
            snap_state,
        }
    }
}

impl From<SceneData> for Scene {
    fn from(data: SceneData) -> Self {
        let mut scene = Scene::new(data.name);
        scene.version = data.version;
        for part in data.parts {
            scene.add_part(part);
        }
        scene.set_snap_state(data.snap_state);
        scene
    }
}

impl Serialize for Scene {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        SceneData::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Scene {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data = SceneData::deserialize(deserializer)?;
        Ok(Scene::from(data))
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("New Base")
    }
}

impl Scene {
    /// Create a new empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: 1,
            name: name.into(),
            parts: HashMap::new(),
            order: Vec::new(),
            snap_state: SnapStateCache::new(),
        }
    }

    /// Save scene to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let content = self.to_bytes()?;
        std::fs::write(path.as_ref(), content).map_err(|e| SceneError::Io(e.to_string()))?;
        Ok(())
    }

    /// Serialize scene to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, SceneError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SceneError::Serialize(e.to_string()))?;
        Ok(content.into_bytes())
    }

    /// Load scene from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| SceneError::Io(e.to_string()))?;
        ron::from_str(&content).map_err(|e| SceneError::Deserialize(e.to_string()))
    }

    /// Load scene from bytes
    pub fn load_from_bytes(data: &[u8]) -> Result<Self, SceneError> {
        let content =
            std::str::from_utf8(data).map_err(|e| SceneError::Deserialize(e.to_string()))?;
        ron::from_str(content).map_err(|e| SceneError::Deserialize(e.to_string()))
    }

    // ============== Part Accessors ==============

    /// Add a part, returns its ID. Re-adding an existing ID replaces the part
    /// in place.
    pub fn add_part(&mut self, part: PartInstance) -> Uuid {
        let id = part.id;
        if self.parts.insert(id, part).is_none() {
            self.order.push(id);
        }
        id
    }

    /// Get a part by ID
    pub fn get_part(&self, id: Uuid) -> Option<&PartInstance> {
        self.parts.get(&id)
    }

    /// Get a mutable part by ID
    pub fn get_part_mut(&mut self, id: Uuid) -> Option<&mut PartInstance> {
        self.parts.get_mut(&id)
    }

    /// Remove a part by ID
    pub fn remove_part(&mut self, id: Uuid) -> Option<PartInstance> {
        let removed = self.parts.remove(&id)?;
        self.order.retain(|other| *other != id);
        self.snap_state.remove(id);
        Some(removed)
    }

    /// Iterate over parts in placement order
    pub fn parts_iter(&self) -> impl Iterator<Item = &PartInstance> {
        self.order.iter().filter_map(|id| self.parts.get(id))
    }

    /// Part IDs in placement order
    pub fn part_ids(&self) -> &[Uuid] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    // ============== Snap State ==============

    /// Snap memory stored with the scene
    pub fn snap_state(&self) -> &SnapStateCache {
        &self.snap_state
    }

    /// Replace the stored snap memory, dropping entries for missing parts
    pub fn set_snap_state(&mut self, mut state: SnapStateCache) {
        state.retain(|id| self.parts.contains_key(&id));
        self.snap_state = state;
    }
}

impl InstanceSource for Scene {
    fn instance(&self, id: Uuid) -> Option<&PartInstance> {
        self.get_part(id)
    }

    fn instance_mut(&mut self, id: Uuid) -> Option<&mut PartInstance> {
        self.get_part_mut(id)
    }

    fn instances(&self) -> Box<dyn Iterator<Item = &PartInstance> + '_> {
        Box::new(self.parts_iter())
    }
}

/// Scene-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}
