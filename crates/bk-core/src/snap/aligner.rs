//! Snap-point to snap-point alignment

use std::f64::consts::FRAC_PI_2;

use tracing::{debug, warn};

use crate::part::{PartInstance, PartKind};
use crate::registry::{PairingEntry, PairingRegistry, SnapGroupRegistry, SnapPoint};
use crate::transform::Transform;

use super::AlignError;
use super::cache::{SnapState, SnapStateCache};
use super::cycle::SnapCycle;

/// Computes source placements from the registries
#[derive(Debug, Clone, Copy)]
pub struct Aligner<'a> {
    groups: &'a SnapGroupRegistry,
    pairings: &'a PairingRegistry,
}

impl<'a> Aligner<'a> {
    pub fn new(groups: &'a SnapGroupRegistry, pairings: &'a PairingRegistry) -> Self {
        Self { groups, pairings }
    }

    /// Snap `source` onto `target`.
    ///
    /// The source always ends up at least coincident with the target, and
    /// remembers the target for later re-snapping. Returns `Ok(true)` only
    /// when an oriented snap-point alignment was applied.
    pub fn align(
        &self,
        cache: &mut SnapStateCache,
        source: &mut PartInstance,
        target: &PartInstance,
        cycle: SnapCycle,
    ) -> Result<bool, AlignError> {
        if source.id == target.id {
            return Err(AlignError::SelfSnap(source.id));
        }

        if target.kind == PartKind::Preset {
            // Preset roots are authored Z-up
            source.world_transform = target.world_transform * Transform::rotation_x(FRAC_PI_2);
            debug!("Placed {} on preset {}", source.type_id, target.type_id);
            return Ok(false);
        }

        source.world_transform = target.world_transform;
        let start = source.world_transform;
        cache.set_snapped_to(source.id, Some(target.id));

        let (Some(target_group), Some(source_group)) = (
            self.groups.group_of(&target.type_id),
            self.groups.group_of(&source.type_id),
        ) else {
            debug!(
                "No snap group for {} -> {}, coincident placement only",
                source.type_id, target.type_id
            );
            return Ok(false);
        };

        let Some(entry) = self.pairings.options_for(target_group, source_group) else {
            debug!(
                "No pairing for {} -> {}, coincident placement only",
                source_group, target_group
            );
            return Ok(false);
        };

        let (Some(target_points), Some(source_points)) = (
            self.groups.points_of(target_group),
            self.groups.points_of(source_group),
        ) else {
            return Ok(false);
        };

        let target_key = resolve_target_key(&cache.get(target.id), entry, cycle);
        let self_pairing = source_group == target_group;
        let source_key = resolve_source_key(
            &cache.get(source.id),
            entry,
            target_points.get(&target_key),
            self_pairing,
            cycle,
        );

        let (Some(target_point), Some(source_point)) =
            (target_points.get(&target_key), source_points.get(&source_key))
        else {
            warn!(
                "Snap keys {}/{} not found in groups {}/{}, coincident placement only",
                target_key, source_key, target_group, source_group
            );
            return Ok(false);
        };

        let Some(placement) = snap_placement(
            &start,
            &source_point.local_transform,
            &target.world_transform,
            &target_point.local_transform,
        ) else {
            warn!(
                "Degenerate transform on {}, coincident placement only",
                target.id
            );
            return Ok(false);
        };
        source.world_transform = placement;

        // The source's opposite face is where the next identical part chains on
        cache.set_target_key(target.id, Some(target_key.clone()));
        cache.set(
            source.id,
            SnapState {
                source_key: Some(source_key.clone()),
                target_key: source_point.opposite.clone(),
                snapped_to: Some(target.id),
            },
        );

        debug!(
            "Snapped {}:{} onto {}:{}",
            source.type_id, source_key, target.type_id, target_key
        );
        Ok(true)
    }
}

/// Remembered target key if still offered, else the default; then cycled
fn resolve_target_key(state: &SnapState, entry: &PairingEntry, cycle: SnapCycle) -> String {
    let key = state
        .target_key
        .as_ref()
        .filter(|key| entry.target_keys().contains(*key))
        .cloned()
        .unwrap_or_else(|| entry.default_target_key().to_string());
    cycle.step_target(entry.target_keys(), key)
}

/// Source key resolution.
///
/// For self-pairing the default is the target point's opposite, and cycling
/// the target forces it so the chain stays continuous. Otherwise a remembered
/// key wins if it is still offered.
fn resolve_source_key(
    state: &SnapState,
    entry: &PairingEntry,
    target_point: Option<&SnapPoint>,
    self_pairing: bool,
    cycle: SnapCycle,
) -> String {
    let opposite = target_point
        .filter(|_| self_pairing)
        .and_then(|point| point.opposite.clone());
    let default_key = opposite.unwrap_or_else(|| entry.default_source_key().to_string());

    let key = if self_pairing && cycle.cycles_target() {
        default_key
    } else {
        state
            .source_key
            .as_ref()
            .filter(|key| entry.source_keys().contains(*key))
            .cloned()
            .unwrap_or(default_key)
    };
    cycle.step_source(entry.source_keys(), key)
}

/// World placement for a source so that its snap frame meets the target's
/// snap frame face-to-face.
///
/// `start` is the source's current world transform. The source frame is
/// flipped half a turn about its local Y, expressed relative to `start`, and
/// the inverse of that offset is hung off the target frame. Returns `None`
/// when a transform on the path is not invertible.
pub fn snap_placement(
    start: &Transform,
    source_local: &Transform,
    target_world: &Transform,
    target_local: &Transform,
) -> Option<Transform> {
    let target_snap = *target_world * *target_local;
    let flipped_snap = *start * *source_local * Transform::FLIP_Y;
    let local_offset = start.try_inverse()? * flipped_snap;
    Some(target_snap * local_offset.try_inverse()?)
}
