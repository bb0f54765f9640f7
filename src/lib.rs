//! High-fidelity N-body orbital mechanics for a spaceflight game:
//! Newtonian gravitation with oblateness, Chebyshev-backed ephemerides,
//! adaptive vessel trajectories, and pile-ups of rigid parts.
//!
//! This crate is a facade; the work happens in the member crates,
//! re-exported here under stable names so front-ends depend on one crate.

pub use nbody_config as config;
pub use nbody_export as export;
pub use nbody_geometry as geometry;
pub use nbody_numerics as numerics;
pub use nbody_physics as physics;
pub use nbody_pileup as pileup;
pub use nbody_quantities as quantities;
pub use nbody_trajectory as trajectory;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
