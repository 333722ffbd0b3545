//! Per-instance memory of the last snap keys chosen

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Keys last used by one instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapState {
    /// Key used when this instance was last snapped as the source
    pub source_key: Option<String>,
    /// Key to offer when this instance is next used as a target
    pub target_key: Option<String>,
    /// Instance this one was last snapped onto
    pub snapped_to: Option<Uuid>,
}

/// Side table of snap state keyed by instance identity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapStateCache {
    entries: BTreeMap<Uuid, SnapState>,
}

impl SnapStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// State for an instance (empty for unseen ids)
    pub fn get(&self, id: Uuid) -> SnapState {
        self.entries.get(&id).cloned().unwrap_or_default()
    }

    /// Replace the whole state of an instance
    pub fn set(&mut self, id: Uuid, state: SnapState) {
        self.entries.insert(id, state);
    }

    /// Replace only the target key, keeping the rest of the state
    pub fn set_target_key(&mut self, id: Uuid, target_key: Option<String>) {
        self.entries.entry(id).or_default().target_key = target_key;
    }

    /// Remember which instance `id` was last snapped onto
    pub fn set_snapped_to(&mut self, id: Uuid, target: Option<Uuid>) {
        self.entries.entry(id).or_default().snapped_to = target;
    }

    /// Drop the state of a destroyed instance
    pub fn remove(&mut self, id: Uuid) -> Option<SnapState> {
        self.entries.remove(&id)
    }

    /// Drop state for every id the predicate rejects
    pub fn retain(&mut self, mut keep: impl FnMut(Uuid) -> bool) {
        self.entries.retain(|id, _| keep(*id));
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
