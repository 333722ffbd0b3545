//! Global constants for bk-core

/// Maximum world distance between two snap points that still counts as connected
pub const CONNECT_EPSILON: f64 = 0.05;

/// Determinant magnitude below which a basis is treated as degenerate
pub const DETERMINANT_EPSILON: f64 = 1e-12;

/// Type id of the wire control point part
pub const DEFAULT_CONTROL_TYPE_ID: &str = "POWER_CONTROL";

/// Snap-point name filter for electrical connections
pub const DEFAULT_POWER_FILTER: &str = "POWER";

/// Type ids of parts stretched between two control points
pub const DEFAULT_LINE_TYPE_IDS: &[&str] =
    &["U_POWERLINE", "U_PIPELINE", "U_PORTALLINE", "U_BYTEBEATLINE"];

/// File name of the authored snap-point table inside a tables directory
pub const SNAP_POINTS_FILE: &str = "snapping_info.json";

/// File name of the authored pairing table inside a tables directory
pub const SNAP_PAIRS_FILE: &str = "snapping_pairs.json";
