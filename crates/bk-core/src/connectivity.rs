//! Proximity queries over snap points in world space
//!
//! Two instances are connected when any pair of their (filtered) snap points
//! lie within `epsilon` of each other. The relation is symmetric but not
//! transitive; networks are built by callers from repeated queries.

use glam::DVec3;
use uuid::Uuid;

use crate::part::{PartInstance, PartKind};
use crate::registry::{SnapGroupRegistry, SnapPoint};
use crate::transform::Transform;

/// Connectivity queries backed by the snap group registry
#[derive(Debug, Clone, Copy)]
pub struct ConnectivityIndex<'a> {
    groups: &'a SnapGroupRegistry,
    epsilon: f64,
}

impl<'a> ConnectivityIndex<'a> {
    pub fn new(groups: &'a SnapGroupRegistry, epsilon: f64) -> Self {
        Self { groups, epsilon }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Snap points of a part whose name contains `filter` (empty = all),
    /// sorted by name
    pub fn matching_points(&self, part: &PartInstance, filter: &str) -> Vec<&'a SnapPoint> {
        let Some(points) = self.groups.points_for_type(&part.type_id) else {
            return Vec::new();
        };
        let mut matching: Vec<&SnapPoint> = points
            .values()
            .filter(|point| point.name.contains(filter))
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));
        matching
    }

    /// Whether the part has any snap point matching `filter`
    pub fn has_snap_point(&self, part: &PartInstance, filter: &str) -> bool {
        !self.matching_points(part, filter).is_empty()
    }

    /// World frame of one named snap point
    pub fn snap_world_transform(&self, part: &PartInstance, key: &str) -> Option<Transform> {
        let point = self.groups.points_for_type(&part.type_id)?.get(key)?;
        Some(part.world_transform * point.local_transform)
    }

    /// World positions of the matching snap points
    pub fn snap_positions(&self, part: &PartInstance, filter: &str) -> Vec<DVec3> {
        self.matching_points(part, filter)
            .into_iter()
            .map(|point| (part.world_transform * point.local_transform).translation())
            .collect()
    }

    /// Every other instance with a matching snap point within epsilon of one
    /// of `part`'s matching snap points. Each instance appears at most once,
    /// in iteration order.
    pub fn connected<'s, I>(
        &self,
        part: &PartInstance,
        filter: &str,
        instances: I,
    ) -> Vec<&'s PartInstance>
    where
        I: IntoIterator<Item = &'s PartInstance>,
    {
        let own = self.snap_positions(part, filter);
        if own.is_empty() {
            return Vec::new();
        }

        instances
            .into_iter()
            .filter(|other| other.id != part.id)
            .filter(|other| {
                self.snap_positions(other, filter).iter().any(|theirs| {
                    own.iter()
                        .any(|mine| mine.distance(*theirs) < self.epsilon)
                })
            })
            .collect()
    }

    /// Ids of connected instances
    pub fn connected_ids<'s, I>(&self, part: &PartInstance, filter: &str, instances: I) -> Vec<Uuid>
    where
        I: IntoIterator<Item = &'s PartInstance>,
    {
        self.connected(part, filter, instances)
            .into_iter()
            .map(|other| other.id)
            .collect()
    }

    /// A control point is floating when it touches no ordinary part and
    /// fewer than two wire pieces (lines or other controls).
    pub fn is_floating<'s, I>(&self, part: &PartInstance, filter: &str, instances: I) -> bool
    where
        I: IntoIterator<Item = &'s PartInstance>,
    {
        if part.kind != PartKind::Control {
            return false;
        }

        let mut wire_connections = 0;
        for other in self.connected(part, filter, instances) {
            if !other.kind.is_connector() {
                return false;
            }
            wire_connections += 1;
        }
        wire_connections < 2
    }

    /// The nearest pair of matching snap points between two parts, as
    /// `(source key, target key)`
    pub fn closest_snap_points(
        &self,
        source: &PartInstance,
        target: &PartInstance,
        source_filter: &str,
        target_filter: &str,
    ) -> Option<(String, String)> {
        let target_frames: Vec<(&str, DVec3)> = self
            .matching_points(target, target_filter)
            .into_iter()
            .map(|point| {
                let position = (target.world_transform * point.local_transform).translation();
                (point.name.as_str(), position)
            })
            .collect();

        let mut best: Option<(f64, &str, &str)> = None;
        for source_point in self.matching_points(source, source_filter) {
            let position = (source.world_transform * source_point.local_transform).translation();
            for (target_key, target_position) in &target_frames {
                let distance = position.distance(*target_position);
                if best.is_none_or(|(lowest, _, _)| distance < lowest) {
                    best = Some((distance, source_point.name.as_str(), *target_key));
                }
            }
        }
        best.map(|(_, source_key, target_key)| (source_key.to_string(), target_key.to_string()))
    }
}
