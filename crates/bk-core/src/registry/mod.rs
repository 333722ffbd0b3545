//! Snap group registry
//!
//! Maps part type ids to snap groups and each group to its named local snap
//! frames. Built once from authored data and read-only afterwards.

mod data;
mod pairing;

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use tracing::info;

use crate::transform::Transform;

pub use pairing::{PairingEntry, PairingRegistry};

use data::RawSnapTable;

/// A named local attachment frame on a part type
#[derive(Debug, Clone, PartialEq)]
pub struct SnapPoint {
    pub name: String,
    /// Frame relative to the part origin
    pub local_transform: Transform,
    /// Point on the far side of the same part (chains identical parts)
    pub opposite: Option<String>,
}

impl SnapPoint {
    pub fn new(name: impl Into<String>, local_transform: Transform) -> Self {
        Self {
            name: name.into(),
            local_transform,
            opposite: None,
        }
    }

    /// Set the opposite point name
    pub fn with_opposite(mut self, opposite: impl Into<String>) -> Self {
        self.opposite = Some(opposite.into());
        self
    }
}

/// Part types sharing one set of snap points
#[derive(Debug, Clone, PartialEq)]
pub struct SnapGroup {
    pub id: String,
    pub member_type_ids: BTreeSet<String>,
    pub points: HashMap<String, SnapPoint>,
}

impl SnapGroup {
    /// Create an empty group
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            member_type_ids: BTreeSet::new(),
            points: HashMap::new(),
        }
    }

    /// Add a member part type
    pub fn with_member(mut self, type_id: impl Into<String>) -> Self {
        self.member_type_ids.insert(type_id.into());
        self
    }

    /// Add a snap point (replaces any point with the same name)
    pub fn with_point(mut self, point: SnapPoint) -> Self {
        self.points.insert(point.name.clone(), point);
        self
    }

    /// Check the group's own invariants
    fn validate(&self) -> Result<(), DataError> {
        for point in self.points.values() {
            if !point.local_transform.is_invertible() {
                return Err(DataError::DegenerateMatrix {
                    group: self.id.clone(),
                    point: point.name.clone(),
                });
            }
            if let Some(opposite) = &point.opposite
                && !self.points.contains_key(opposite)
            {
                return Err(DataError::DanglingOpposite {
                    group: self.id.clone(),
                    point: point.name.clone(),
                    opposite: opposite.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Read-only registry of snap groups
#[derive(Debug, Clone, Default)]
pub struct SnapGroupRegistry {
    groups: HashMap<String, SnapGroup>,
    /// Type id to group id index (O(1) lookup)
    type_index: HashMap<String, String>,
}

impl SnapGroupRegistry {
    /// Build and validate a registry from groups
    pub fn new(groups: impl IntoIterator<Item = SnapGroup>) -> Result<Self, DataError> {
        let mut registry = Self::default();
        for group in groups {
            group.validate()?;
            if registry.groups.contains_key(&group.id) {
                return Err(DataError::DuplicateGroup(group.id));
            }
            for type_id in &group.member_type_ids {
                if let Some(first) = registry.type_index.get(type_id) {
                    return Err(DataError::DuplicateMember {
                        type_id: type_id.clone(),
                        first: first.clone(),
                        second: group.id.clone(),
                    });
                }
                registry.type_index.insert(type_id.clone(), group.id.clone());
            }
            registry.groups.insert(group.id.clone(), group);
        }
        Ok(registry)
    }

    /// Load the snap-point table from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DataError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
    }

    /// Parse the snap-point table from JSON text
    pub fn from_json_str(content: &str) -> Result<Self, DataError> {
        let table: RawSnapTable =
            serde_json::from_str(content).map_err(|e| DataError::Parse(e.to_string()))?;

        let groups = table.into_iter().map(|(id, raw)| SnapGroup {
            member_type_ids: raw.parts.into_iter().collect(),
            points: raw
                .snap_points
                .into_iter()
                .map(|(name, point)| {
                    let snap = SnapPoint {
                        name: name.clone(),
                        local_transform: Transform::from_rows(point.matrix),
                        opposite: point.opposite,
                    };
                    (name, snap)
                })
                .collect(),
            id,
        });

        let registry = Self::new(groups)?;
        info!(
            "Loaded {} snap groups covering {} part types",
            registry.group_count(),
            registry.type_index.len()
        );
        Ok(registry)
    }

    /// Group id of a part type (None for unregistered types)
    pub fn group_of(&self, type_id: &str) -> Option<&str> {
        self.type_index.get(type_id).map(String::as_str)
    }

    /// Snap points of a group
    pub fn points_of(&self, group_id: &str) -> Option<&HashMap<String, SnapPoint>> {
        self.groups.get(group_id).map(|g| &g.points)
    }

    /// Snap points of a part type (group lookup + point lookup)
    pub fn points_for_type(&self, type_id: &str) -> Option<&HashMap<String, SnapPoint>> {
        self.group_of(type_id).and_then(|g| self.points_of(g))
    }

    /// Get a group by id
    pub fn group(&self, group_id: &str) -> Option<&SnapGroup> {
        self.groups.get(group_id)
    }

    /// Iterate over all groups
    pub fn groups(&self) -> impl Iterator<Item = &SnapGroup> {
        self.groups.values()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Errors in authored snap data (load time only)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Malformed snap table: {0}")]
    Parse(String),
    #[error("Duplicate snap group: {0}")]
    DuplicateGroup(String),
    #[error("Part type {type_id} listed in both group {first} and group {second}")]
    DuplicateMember {
        type_id: String,
        first: String,
        second: String,
    },
    #[error("Snap point {group}/{point} references missing opposite {opposite}")]
    DanglingOpposite {
        group: String,
        point: String,
        opposite: String,
    },
    #[error("Snap point {group}/{point} has a non-invertible matrix")]
    DegenerateMatrix { group: String, point: String },
    #[error("Pairing {target_group} <- {source_group} has an empty key list")]
    EmptyPairing {
        target_group: String,
        source_group: String,
    },
    #[error("Pairing references unknown snap group {0}")]
    UnknownGroup(String),
    #[error("Pairing key {point} is not a snap point of group {group}")]
    UnknownPoint { group: String, point: String },
}
