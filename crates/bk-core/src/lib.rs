//! Base Kit Core
//!
//! Snapping and connectivity engine for modular base parts:
//! - Transform: affine placement matrix with right/up/at basis
//! - SnapGroupRegistry / PairingRegistry: authored snap tables
//! - SnapStateCache / Aligner: snap-point alignment and key cycling
//! - ConnectivityIndex: proximity queries over live instances
//! - SnapEngine: id-based facade over a scene

pub mod config;
pub mod connectivity;
pub mod constants;
pub mod engine;
pub mod part;
pub mod registry;
pub mod scene;
pub mod snap;
pub mod transform;

pub use config::*;
pub use connectivity::*;
pub use constants::*;
pub use engine::*;
pub use part::*;
pub use registry::*;
pub use scene::*;
pub use snap::*;
pub use transform::*;
