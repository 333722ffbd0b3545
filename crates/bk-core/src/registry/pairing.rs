//! Pairing table: which groups may snap onto which, and through which keys

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use super::data::{RawPairTable, split_keys};
use super::{DataError, SnapGroupRegistry};

/// Ordered attachment options for one `(target group, source group)` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingEntry {
    target_keys: Vec<String>,
    source_keys: Vec<String>,
}

impl PairingEntry {
    /// Create an entry. Returns `None` when either key list is empty.
    pub fn new(target_keys: Vec<String>, source_keys: Vec<String>) -> Option<Self> {
        if target_keys.is_empty() || source_keys.is_empty() {
            return None;
        }
        Some(Self {
            target_keys,
            source_keys,
        })
    }

    /// Create an entry from two comma-separated key lists
    pub fn from_key_lists(target_keys: &str, source_keys: &str) -> Option<Self> {
        Self::new(split_keys(target_keys), split_keys(source_keys))
    }

    /// Valid keys on the target side, in cycle order
    pub fn target_keys(&self) -> &[String] {
        &self.target_keys
    }

    /// Valid keys on the source side, in cycle order
    pub fn source_keys(&self) -> &[String] {
        &self.source_keys
    }

    pub fn default_target_key(&self) -> &str {
        &self.target_keys[0]
    }

    pub fn default_source_key(&self) -> &str {
        &self.source_keys[0]
    }
}

/// Read-only registry of pairing entries
#[derive(Debug, Clone, Default)]
pub struct PairingRegistry {
    /// target group -> source group -> entry
    entries: HashMap<String, HashMap<String, PairingEntry>>,
}

impl PairingRegistry {
    /// Build a registry from `((target group, source group), entry)` items
    pub fn new(entries: impl IntoIterator<Item = ((String, String), PairingEntry)>) -> Self {
        let mut registry = Self::default();
        for ((target_group, source_group), entry) in entries {
            registry
                .entries
                .entry(target_group)
                .or_default()
                .insert(source_group, entry);
        }
        registry
    }

    /// Load the pairing table from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DataError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
    }

    /// Parse the pairing table from JSON text
    pub fn from_json_str(content: &str) -> Result<Self, DataError> {
        let table: RawPairTable =
            serde_json::from_str(content).map_err(|e| DataError::Parse(e.to_string()))?;

        let mut entries = Vec::new();
        for (target_group, sources) in table {
            for (source_group, (target_keys, source_keys)) in sources {
                let Some(entry) = PairingEntry::from_key_lists(&target_keys, &source_keys) else {
                    return Err(DataError::EmptyPairing {
                        target_group,
                        source_group,
                    });
                };
                entries.push(((target_group.clone(), source_group), entry));
            }
        }

        let registry = Self::new(entries);
        info!("Loaded {} snap pairings", registry.len());
        Ok(registry)
    }

    /// Attachment options when snapping a `source_group` part onto a
    /// `target_group` part. `None` means no declared compatibility.
    pub fn options_for(&self, target_group: &str, source_group: &str) -> Option<&PairingEntry> {
        self.entries.get(target_group)?.get(source_group)
    }

    /// Number of pairing entries
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Report entries that reference groups or points the group registry
    /// does not know. The tables load independently, so these are warnings.
    pub fn lint(&self, groups: &SnapGroupRegistry) -> Vec<DataError> {
        let mut problems = Vec::new();
        for (target_group, sources) in &self.entries {
            for (source_group, entry) in sources {
                for (group, keys) in [
                    (target_group, entry.target_keys()),
                    (source_group, entry.source_keys()),
                ] {
                    let Some(points) = groups.points_of(group) else {
                        problems.push(DataError::UnknownGroup(group.clone()));
                        continue;
                    };
                    problems.extend(keys.iter().filter(|key| !points.contains_key(*key)).map(
                        |key| DataError::UnknownPoint {
                            group: group.clone(),
                            point: key.clone(),
                        },
                    ));
                }
            }
        }
        problems.sort_by_key(|p| p.to_string());
        problems.dedup();
        problems
    }
}
