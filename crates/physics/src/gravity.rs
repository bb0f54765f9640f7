//! Gravitational accelerations: point-mass and degree-2 zonal terms.

use crate::body::Oblateness;
use nbody_geometry::{AccelerationVector, Displacement, Frame, dot};
use nbody_quantities::{GravitationalParameter, Length};

/// Acceleration of a test mass at displacement `r` from the centre of a
/// point mass with parameter `mu`.
pub fn point_mass_acceleration<F: Frame>(
    mu: GravitationalParameter,
    r: &Displacement<F>,
) -> AccelerationVector<F> {
    let distance = r.norm();
    assert!(
        distance > Length::ZERO,
        "gravitational evaluation at the centre of a body"
    );
    let r3 = distance * distance * distance;
    -*r * (mu / r3)
}

/// The J₂ correction on a test mass at displacement `r` from the centre of
/// an oblate body:
/// `−(3 J₂ μ R²)/(2 r⁴) · [(1 − 5 u²) r̂ + 2 u ẑ]`, with `u = r̂ · ẑ`.
pub fn degree_two_zonal_acceleration<F: Frame>(
    oblateness: &Oblateness<F>,
    mu: GravitationalParameter,
    r: &Displacement<F>,
) -> AccelerationVector<F> {
    let distance = r.norm();
    assert!(
        distance > Length::ZERO,
        "gravitational evaluation at the centre of a body"
    );
    let r_hat = *r / distance;
    let u = dot(&r_hat, &oblateness.axis);
    let radius_ratio = oblateness.reference_radius / distance;
    let magnitude = (mu / (distance * distance))
        * (1.5 * oblateness.j2 * radius_ratio * radius_ratio);
    -(r_hat * (1.0 - 5.0 * u * u) + oblateness.axis * (2.0 * u)) * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nbody_geometry::{Icrs, Vector};
    use nbody_quantities::Quantity;
    use nbody_quantities::si::*;

    const MU: f64 = 3.986004418e14;
    const R_REF: f64 = 6.378136e6;
    const J2: f64 = 1.0826e-3;

    fn earth_oblateness() -> Oblateness<Icrs> {
        Oblateness {
            j2: J2,
            reference_radius: metres(R_REF),
            axis: Vector::new(0.0, 0.0, 1.0),
        }
    }

    #[test]
    fn point_mass_follows_the_inverse_square_law() {
        let r = Displacement::<Icrs>::new(metres(7.0e6), metres(0.0), metres(0.0));
        let a = point_mass_acceleration(gravitational_parameter(MU), &r);
        assert!(a.x() < metres_per_second_squared(0.0));
        assert_relative_eq!(a.norm().si(), MU / 4.9e13, max_relative = 1e-12);
    }

    #[test]
    fn oblateness_strengthens_equatorial_attraction() {
        let r = Displacement::<Icrs>::new(metres(7.0e6), metres(0.0), metres(0.0));
        let a = degree_two_zonal_acceleration(&earth_oblateness(), gravitational_parameter(MU), &r);
        // In the equatorial plane the correction points towards the body.
        assert!(a.x() < metres_per_second_squared(0.0));
        assert_relative_eq!(
            a.norm().si(),
            1.5 * J2 * (MU / 4.9e13) * (R_REF / 7.0e6).powi(2),
            max_relative = 1e-12
        );
    }

    #[test]
    fn oblateness_weakens_polar_attraction() {
        let r = Displacement::<Icrs>::new(metres(0.0), metres(0.0), metres(7.0e6));
        let a = degree_two_zonal_acceleration(&earth_oblateness(), gravitational_parameter(MU), &r);
        // Over the pole the correction points away from the body.
        assert!(a.z() > metres_per_second_squared(0.0));
        assert_relative_eq!(
            a.norm().si(),
            3.0 * J2 * (MU / 4.9e13) * (R_REF / 7.0e6).powi(2),
            max_relative = 1e-12
        );
    }

    #[test]
    fn oblateness_correction_is_the_gradient_of_the_zonal_term() {
        // The correction is ∇ of −½ J₂ μ R² (3 (r·ẑ)² − r²) / r⁵;
        // compare against a central-difference gradient.
        let zonal_term = |x: f64, y: f64, z: f64| {
            let r2 = x * x + y * y + z * z;
            let r = r2.sqrt();
            -0.5 * J2 * MU * R_REF * R_REF * (3.0 * z * z - r2) / (r2 * r2 * r)
        };
        let (x, y, z) = (5.0e6, 2.0e6, 4.0e6);
        let h = 1.0;
        let numerical = [
            (zonal_term(x + h, y, z) - zonal_term(x - h, y, z)) / (2.0 * h),
            (zonal_term(x, y + h, z) - zonal_term(x, y - h, z)) / (2.0 * h),
            (zonal_term(x, y, z + h) - zonal_term(x, y, z - h)) / (2.0 * h),
        ];
        let a = degree_two_zonal_acceleration(
            &earth_oblateness(),
            gravitational_parameter(MU),
            &Displacement::<Icrs>::new(metres(x), metres(y), metres(z)),
        );
        assert_relative_eq!(a.x().si(), numerical[0], max_relative = 1e-5);
        assert_relative_eq!(a.y().si(), numerical[1], max_relative = 1e-5);
        assert_relative_eq!(a.z().si(), numerical[2], max_relative = 1e-5);
    }
}
