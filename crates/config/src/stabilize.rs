//! Resonance stabilization of the stock Jool system.
//!
//! The stock moons are unstable over long integrations. Instead of the
//! game's 1:2:4 Laythe–Vall–Tylo resonance, this puts them in a
//! 1 : 4/φ : 16/φ² dissonance, and makes Bop retrograde above Pol.

use crate::{ConfigError, SolarSystem};
use nbody_physics::KeplerianElements;
use nbody_quantities::AngularFrequency;
use nbody_quantities::si::{degrees, gravitational_parameter};

const GOLDEN_RATIO: f64 = 1.618033988749894848204586834365638118;

fn with_mean_motion(
    system: &SolarSystem,
    name: &str,
    mean_motion: AngularFrequency,
) -> Result<KeplerianElements, ConfigError> {
    let mut elements = system.keplerian_elements(name)?.clone();
    let parent = system.parent_name(name)?.to_string();
    elements.semimajor_axis = None;
    elements.period = None;
    elements.mean_motion = Some(mean_motion);
    elements.complete(gravitational_parameter(
        system.gravitational_parameter(&parent)?,
    ));
    Ok(elements)
}

/// Adjusts Vall, Tylo and Bop in place.
pub fn stabilize_jool_system(system: &mut SolarSystem) -> Result<(), ConfigError> {
    let laythe_mean_motion = system.keplerian_elements("Laythe")?.mean_motion();
    let pol_mean_motion = system.keplerian_elements("Pol")?.mean_motion();

    let vall = with_mean_motion(
        system,
        "Vall",
        laythe_mean_motion / (4.0 / GOLDEN_RATIO),
    )?;
    let tylo = with_mean_motion(
        system,
        "Tylo",
        laythe_mean_motion / (16.0 / (GOLDEN_RATIO * GOLDEN_RATIO)),
    )?;

    // All hail Retrobop.
    let mut bop = with_mean_motion(system, "Bop", pol_mean_motion / 0.7)?;
    bop.inclination = degrees(180.0) - bop.inclination;

    system.replace_elements("Vall", vall)?;
    system.replace_elements("Tylo", tylo)?;
    system.replace_elements("Bop", bop)?;
    Ok(())
}
