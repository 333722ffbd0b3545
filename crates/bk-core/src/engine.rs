//! Id-based facade over the snapping components

use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::connectivity::ConnectivityIndex;
use crate::constants::{SNAP_PAIRS_FILE, SNAP_POINTS_FILE};
use crate::part::{PartInstance, PartKind};
use crate::registry::{DataError, PairingRegistry, SnapGroupRegistry};
use crate::scene::{InstanceSource, Scene};
use crate::snap::{AlignError, Aligner, SnapCycle, SnapStateCache};

/// Snapping engine: shared read-only registries plus per-instance snap state
#[derive(Debug, Clone)]
pub struct SnapEngine {
    groups: Arc<SnapGroupRegistry>,
    pairings: Arc<PairingRegistry>,
    cache: SnapStateCache,
    config: EngineConfig,
}

impl SnapEngine {
    /// Create an engine from loaded registries
    pub fn new(
        groups: Arc<SnapGroupRegistry>,
        pairings: Arc<PairingRegistry>,
        config: EngineConfig,
    ) -> Self {
        Self {
            groups,
            pairings,
            cache: SnapStateCache::new(),
            config,
        }
    }

    /// Load both authored tables from a directory
    pub fn load_tables(dir: impl AsRef<Path>, config: EngineConfig) -> Result<Self, DataError> {
        let dir = dir.as_ref();
        let groups = SnapGroupRegistry::load(dir.join(SNAP_POINTS_FILE))?;
        let pairings = PairingRegistry::load(dir.join(SNAP_PAIRS_FILE))?;
        for problem in pairings.lint(&groups) {
            warn!("{}", problem);
        }
        info!("Snap tables loaded from {:?}", dir);
        Ok(Self::new(Arc::new(groups), Arc::new(pairings), config))
    }

    pub fn groups(&self) -> &SnapGroupRegistry {
        &self.groups
    }

    pub fn pairings(&self) -> &PairingRegistry {
        &self.pairings
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &SnapStateCache {
        &self.cache
    }

    /// Aligner over this engine's registries
    pub fn aligner(&self) -> Aligner<'_> {
        Aligner::new(&self.groups, &self.pairings)
    }

    /// Connectivity queries with the configured epsilon
    pub fn connectivity(&self) -> ConnectivityIndex<'_> {
        ConnectivityIndex::new(&self.groups, self.config.connect_epsilon)
    }

    /// Snap the source instance onto the target instance.
    ///
    /// Returns whether an oriented (not just coincident) snap occurred.
    pub fn align<S>(
        &mut self,
        scene: &mut S,
        source_id: Uuid,
        target_id: Uuid,
        cycle: SnapCycle,
    ) -> Result<bool, AlignError>
    where
        S: InstanceSource + ?Sized,
    {
        if source_id == target_id {
            return Err(AlignError::SelfSnap(source_id));
        }
        let target = scene
            .instance(target_id)
            .cloned()
            .ok_or(AlignError::InstanceNotFound(target_id))?;
        let source = scene
            .instance_mut(source_id)
            .ok_or(AlignError::InstanceNotFound(source_id))?;

        Aligner::new(&self.groups, &self.pairings).align(&mut self.cache, source, &target, cycle)
    }

    /// Snap the source again onto the instance it was last snapped onto
    pub fn resnap<S>(
        &mut self,
        scene: &mut S,
        source_id: Uuid,
        cycle: SnapCycle,
    ) -> Result<bool, AlignError>
    where
        S: InstanceSource + ?Sized,
    {
        if scene.instance(source_id).is_none() {
            return Err(AlignError::InstanceNotFound(source_id));
        }
        let target_id = self
            .cache
            .get(source_id)
            .snapped_to
            .ok_or(AlignError::NotSnapped(source_id))?;
        self.align(scene, source_id, target_id, cycle)
    }

    /// Ids of instances connected to `id` through snap points matching
    /// `filter` (empty for unknown ids)
    pub fn connected<S>(&self, scene: &S, id: Uuid, filter: &str) -> Vec<Uuid>
    where
        S: InstanceSource + ?Sized,
    {
        let Some(part) = scene.instance(id) else {
            return Vec::new();
        };
        self.connectivity()
            .connected_ids(part, filter, scene.instances())
    }

    /// Whether a control point leads nowhere (false for unknown ids)
    pub fn is_floating<S>(&self, scene: &S, id: Uuid) -> bool
    where
        S: InstanceSource + ?Sized,
    {
        scene.instance(id).is_some_and(|part| {
            self.connectivity()
                .is_floating(part, &self.config.power_filter, scene.instances())
        })
    }

    /// Instances one hop away from any of `ids`, excluding `ids` themselves,
    /// without duplicates and in scene order
    pub fn select_connected<S>(&self, scene: &S, ids: &[Uuid], filter: &str) -> Vec<Uuid>
    where
        S: InstanceSource + ?Sized,
    {
        let mut selected: Vec<Uuid> = Vec::new();
        for id in ids {
            for other in self.connected(scene, *id, filter) {
                if !ids.contains(&other) && !selected.contains(&other) {
                    selected.push(other);
                }
            }
        }
        let order: Vec<Uuid> = scene.instances().map(|p| p.id).collect();
        selected.sort_by_key(|id| order.iter().position(|other| other == id));
        selected
    }

    /// All floating control points, in scene order
    pub fn floating_controls<S>(&self, scene: &S) -> Vec<Uuid>
    where
        S: InstanceSource + ?Sized,
    {
        let index = self.connectivity();
        scene
            .instances()
            .filter(|part| part.kind == PartKind::Control)
            .filter(|part| index.is_floating(part, &self.config.power_filter, scene.instances()))
            .map(|part| part.id)
            .collect()
    }

    /// Drop snap state for an instance that no longer exists
    pub fn forget(&mut self, id: Uuid) {
        self.cache.remove(id);
    }

    /// Remove an instance from the scene together with its snap state
    pub fn remove_instance(&mut self, scene: &mut Scene, id: Uuid) -> Option<PartInstance> {
        self.forget(id);
        scene.remove_part(id)
    }

    /// Take over the snap memory stored in a scene
    pub fn restore_snap_state(&mut self, scene: &Scene) {
        self.cache = scene.snap_state().clone();
        info!("Restored snap state for {} parts", self.cache.len());
    }

    /// Store the snap memory of live parts in a scene for saving
    pub fn persist_snap_state(&self, scene: &mut Scene) {
        scene.set_snap_state(self.cache.clone());
    }

    /// Drop snap state for every instance the scene no longer holds
    pub fn prune_cache<S>(&mut self, scene: &S)
    where
        S: InstanceSource + ?Sized,
    {
        self.cache.retain(|id| scene.instance(id).is_some());
    }
}

/// Engine behind a single lock, for hosts that dispatch from several threads
#[derive(Debug, Clone)]
pub struct SharedEngine(Arc<Mutex<SnapEngine>>);

impl SharedEngine {
    pub fn new(engine: SnapEngine) -> Self {
        Self(Arc::new(Mutex::new(engine)))
    }

    /// Lock the engine for a sequence of calls
    pub fn lock(&self) -> MutexGuard<'_, SnapEngine> {
        self.0.lock()
    }

    /// Snap under the lock
    pub fn align<S>(
        &self,
        scene: &mut S,
        source_id: Uuid,
        target_id: Uuid,
        cycle: SnapCycle,
    ) -> Result<bool, AlignError>
    where
        S: InstanceSource + ?Sized,
    {
        self.lock().align(scene, source_id, target_id, cycle)
    }

    /// Re-snap under the lock
    pub fn resnap<S>(
        &self,
        scene: &mut S,
        source_id: Uuid,
        cycle: SnapCycle,
    ) -> Result<bool, AlignError>
    where
        S: InstanceSource + ?Sized,
    {
        self.lock().resnap(scene, source_id, cycle)
    }
}
