use nbody_core::config::{SolarSystem, load_system, stabilize_jool_system};
use nbody_core::numerics::{FixedStepIntegrator, FixedStepParameters};
use nbody_core::quantities::si::*;

const GOLDEN_RATIO: f64 = 1.618033988749894848204586834365638118;

fn jool_system() -> SolarSystem {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/jool_system.yaml");
    SolarSystem::new(load_system(path).expect("the stock Jool system ships with the repo"))
        .expect("the stock records are consistent")
}

#[test]
fn the_moons_land_on_the_golden_dissonance() {
    let mut system = jool_system();
    stabilize_jool_system(&mut system).unwrap();

    let laythe = system.keplerian_elements("Laythe").unwrap().mean_motion();
    let vall = system.keplerian_elements("Vall").unwrap().mean_motion();
    let tylo = system.keplerian_elements("Tylo").unwrap().mean_motion();

    let vall_ratio = (vall / laythe) / (GOLDEN_RATIO / 4.0) - 1.0;
    let tylo_ratio = (tylo / laythe) / (GOLDEN_RATIO * GOLDEN_RATIO / 16.0) - 1.0;
    assert!(vall_ratio.abs() <= 1.0e-12, "Vall off by {vall_ratio:e}");
    assert!(tylo_ratio.abs() <= 1.0e-12, "Tylo off by {tylo_ratio:e}");
}

#[test]
fn bop_goes_retrograde_above_pol() {
    let mut system = jool_system();
    let initial_inclination = system.keplerian_elements("Bop").unwrap().inclination;
    stabilize_jool_system(&mut system).unwrap();

    let bop = system.keplerian_elements("Bop").unwrap();
    let pol = system.keplerian_elements("Pol").unwrap();
    assert_eq!(bop.inclination, degrees(180.0) - initial_inclination);
    let ratio = (bop.mean_motion() / pol.mean_motion()) * 0.7 - 1.0;
    assert!(ratio.abs() <= 1.0e-12, "Bop off by {ratio:e}");
}

#[test]
fn the_stabilized_system_still_builds_an_ephemeris() {
    let mut system = jool_system();
    stabilize_jool_system(&mut system).unwrap();
    let ephemeris = system
        .make_ephemeris(
            metres(1.0),
            FixedStepParameters::new(
                FixedStepIntegrator::McLachlanAtela1992Order5Optimal,
                seconds(300.0),
            ),
        )
        .unwrap();
    assert_eq!(ephemeris.bodies().len(), 6);
    // A slower mean motion than Pol's puts Retro-Bop outside Pol's orbit.
    let bop = system.keplerian_elements("Bop").unwrap();
    let pol = system.keplerian_elements("Pol").unwrap();
    assert!(bop.semimajor_axis() > pol.semimajor_axis());
}
