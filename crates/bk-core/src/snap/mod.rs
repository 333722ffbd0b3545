//! Snapping: key cycling, per-instance snap memory and alignment

mod aligner;
mod cache;
mod cycle;

use uuid::Uuid;

pub use aligner::{Aligner, snap_placement};
pub use cache::{SnapState, SnapStateCache};
pub use cycle::{CycleStep, SnapCycle, cycle_key};

/// Snap request errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlignError {
    #[error("Part instance not found: {0}")]
    InstanceNotFound(Uuid),
    #[error("Cannot snap part {0} onto itself")]
    SelfSnap(Uuid),
    #[error("Part {0} has not been snapped to anything")]
    NotSnapped(Uuid),
}
