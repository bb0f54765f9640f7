//! Keplerian elements and their conversion to degrees of freedom.

use serde::{Deserialize, Serialize};

use nbody_geometry::{Displacement, Frame, Rotation, Vector, Velocity};
use nbody_numerics::bisect;
use nbody_quantities::si::radians;
use nbody_quantities::{Angle, AngularFrequency, GravitationalParameter, Length, Quantity, Time};

/// Osculating elements of an elliptic two-body orbit about a parent body.
/// Exactly one of `semimajor_axis`, `period` and `mean_motion` is given at
/// construction; [`KeplerianElements::complete`] fills in the other two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeplerianElements {
    pub eccentricity: f64,
    pub semimajor_axis: Option<Length>,
    pub period: Option<Time>,
    pub mean_motion: Option<AngularFrequency>,
    pub inclination: Angle,
    pub longitude_of_ascending_node: Angle,
    pub argument_of_periapsis: Angle,
    pub mean_anomaly: Angle,
}

impl KeplerianElements {
    /// Derives the two missing representations of the orbit size from the
    /// one given, using the parent's gravitational parameter (Kepler's
    /// third law).
    pub fn complete(&mut self, mu: GravitationalParameter) {
        let given = usize::from(self.semimajor_axis.is_some())
            + usize::from(self.period.is_some())
            + usize::from(self.mean_motion.is_some());
        assert!(
            given == 1,
            "exactly one of semimajor axis, period and mean motion must be given, not {given}"
        );
        let tau = radians(2.0 * std::f64::consts::PI);
        let n = if let Some(a) = self.semimajor_axis {
            (mu / (a * a * a)).sqrt()
        } else if let Some(t) = self.period {
            tau / t
        } else {
            self.mean_motion.expect("one representation is given")
        };
        self.mean_motion = Some(n);
        self.period = Some(tau / n);
        self.semimajor_axis = Some((mu / (n * n)).cbrt());
    }

    pub fn mean_motion(&self) -> AngularFrequency {
        self.mean_motion.expect("elements must be completed first")
    }

    pub fn semimajor_axis(&self) -> Length {
        self.semimajor_axis
            .expect("elements must be completed first")
    }

    pub fn period(&self) -> Time {
        self.period.expect("elements must be completed first")
    }
}

/// Solves Kepler's equation `E − e sin E = M` by bisection.
fn eccentric_anomaly(mean_anomaly: Angle, eccentricity: f64) -> Angle {
    assert!(
        (0.0..1.0).contains(&eccentricity),
        "only elliptic orbits have an eccentric anomaly"
    );
    if eccentricity == 0.0 {
        return mean_anomaly;
    }
    let m = mean_anomaly.si();
    let f = |e_anomaly: Angle| {
        let e = e_anomaly.si();
        e - eccentricity * e.sin() - m
    };
    let padding = radians(eccentricity + 1e-9);
    bisect(f, mean_anomaly - padding, mean_anomaly + padding)
}

/// Position and velocity relative to the parent body at the epoch of the
/// elements, in the frame whose x-axis points to the equinox and whose
/// xy-plane is the reference plane of the angles. The elements must have
/// been completed.
pub fn elements_to_relative_degrees_of_freedom<F: Frame>(
    elements: &KeplerianElements,
) -> (Displacement<F>, Velocity<F>) {
    let e = elements.eccentricity;
    let a = elements.semimajor_axis();
    let n = elements.mean_motion();
    let eccentric = eccentric_anomaly(elements.mean_anomaly, e);
    let (sin_e, cos_e) = (eccentric.sin(), eccentric.cos());
    let one_minus_e_cos_e = 1.0 - e * cos_e;
    let root = (1.0 - e * e).sqrt();

    // Perifocal coordinates: x towards periapsis.
    let position = Displacement::<F>::new(
        a * (cos_e - e),
        a * (root * sin_e),
        Length::ZERO,
    );
    let speed_scale = n * a / one_minus_e_cos_e;
    let velocity = Velocity::<F>::new(
        speed_scale * (-sin_e),
        speed_scale * (root * cos_e),
        nbody_quantities::Speed::ZERO,
    );

    // Rotate periapsis → node → equinox: R_z(Ω) R_x(i) R_z(ω).
    let z = Vector::<f64, F>::new(0.0, 0.0, 1.0);
    let x = Vector::<f64, F>::new(1.0, 0.0, 0.0);
    let rotation: Rotation<F, F> =
        Rotation::from_axis_angle(elements.longitude_of_ascending_node, &z)
            * (Rotation::from_axis_angle(elements.inclination, &x)
                * Rotation::from_axis_angle(elements.argument_of_periapsis, &z));
    (
        rotation.apply_vector(&position),
        rotation.apply_vector(&velocity),
    )
}
