//! Trajectory primitives for waypoint moves.
//!
//! A waypoint move samples a per-axis quintic polynomial, optionally through
//! an easing remap of normalized time.

mod easing;
mod quintic;

pub use easing::Easing;
pub use quintic::Quintic;
