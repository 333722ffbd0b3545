//! Raw shapes of the authored JSON tables

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One snap point as authored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RawSnapPoint {
    /// Row-major 4x4 local matrix
    pub matrix: [[f64; 4]; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opposite: Option<String>,
}

/// One snap group as authored
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct RawSnapGroup {
    #[serde(default)]
    pub parts: Vec<String>,
    #[serde(default)]
    pub snap_points: BTreeMap<String, RawSnapPoint>,
}

/// `group id -> group`
pub(crate) type RawSnapTable = BTreeMap<String, RawSnapGroup>;

/// `target group -> source group -> [target keys, source keys]`, each key
/// list a comma-separated string
pub(crate) type RawPairTable = BTreeMap<String, BTreeMap<String, (String, String)>>;

/// Split a comma-separated key list, trimming whitespace and dropping blanks
pub(crate) fn split_keys(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}
