//! Rigid transformations and rigid motions between frames.

use std::ops::Mul;

use serde::{Deserialize, Serialize};

use crate::frame::Frame;
use crate::grassmann::{AngularVelocity, Velocity};
use crate::point::{DegreesOfFreedom, Position};
use crate::rotation::Rotation;

/// An isometry taking positions of `From` to positions of `To`:
/// `x ↦ to_anchor + R (x − from_anchor)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct RigidTransformation<From: Frame, To: Frame> {
    from_anchor: Position<From>,
    to_anchor: Position<To>,
    rotation: Rotation<From, To>,
}

impl<From: Frame, To: Frame> RigidTransformation<From, To> {
    pub fn new(
        from_anchor: Position<From>,
        to_anchor: Position<To>,
        rotation: Rotation<From, To>,
    ) -> Self {
        Self {
            from_anchor,
            to_anchor,
            rotation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Position::origin(), Position::origin(), Rotation::identity())
    }

    pub fn apply(&self, position: &Position<From>) -> Position<To> {
        self.to_anchor + self.rotation.apply_vector(&(*position - self.from_anchor))
    }

    pub fn inverse(&self) -> RigidTransformation<To, From> {
        RigidTransformation::new(self.to_anchor, self.from_anchor, self.rotation.inverse())
    }

    pub fn rotation(&self) -> &Rotation<From, To> {
        &self.rotation
    }
}

impl<A: Frame, B: Frame, C: Frame> Mul<RigidTransformation<A, B>> for RigidTransformation<B, C> {
    type Output = RigidTransformation<A, C>;

    fn mul(self, rhs: RigidTransformation<A, B>) -> RigidTransformation<A, C> {
        RigidTransformation::new(
            rhs.from_anchor,
            self.apply(&rhs.to_anchor),
            self.rotation * rhs.rotation,
        )
    }
}

/// An affine map between the degrees of freedom of two frames: a rigid
/// transformation together with the angular velocity of the target frame
/// and the velocity of the target origin, both expressed in `From`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct RigidMotion<From: Frame, To: Frame> {
    rigid_transformation: RigidTransformation<From, To>,
    angular_velocity_of_to_frame: AngularVelocity<From>,
    velocity_of_to_frame_origin: Velocity<From>,
}

impl<From: Frame, To: Frame> RigidMotion<From, To> {
    pub fn new(
        rigid_transformation: RigidTransformation<From, To>,
        angular_velocity_of_to_frame: AngularVelocity<From>,
        velocity_of_to_frame_origin: Velocity<From>,
    ) -> Self {
        Self {
            rigid_transformation,
            angular_velocity_of_to_frame,
            velocity_of_to_frame_origin,
        }
    }

    /// The translation-only motion mapping `centre` to the origin of `To`
    /// at rest: the `To` frame comoves with `centre` without rotating.
    pub fn non_rotating(centre: DegreesOfFreedom<From>) -> Self {
        Self::new(
            RigidTransformation::new(centre.position, Position::origin(), Rotation::identity()),
            AngularVelocity::zero(),
            centre.velocity,
        )
    }

    /// The translation-only motion whose *inverse* maps `centre` (given in
    /// `To`) to the origin of `From` at rest.
    pub fn non_rotating_from_target(centre: DegreesOfFreedom<To>) -> Self {
        RigidMotion::<To, From>::non_rotating(centre).inverse()
    }

    pub fn apply(&self, dof: &DegreesOfFreedom<From>) -> DegreesOfFreedom<To> {
        let to_origin_in_from = self
            .rigid_transformation
            .inverse()
            .apply(&Position::origin());
        let relative_velocity = dof.velocity
            - self.velocity_of_to_frame_origin
            - self
                .angular_velocity_of_to_frame
                .cross(&(dof.position - to_origin_in_from));
        DegreesOfFreedom::new(
            self.rigid_transformation.apply(&dof.position),
            self.rigid_transformation
                .rotation()
                .apply_vector(&relative_velocity),
        )
    }

    pub fn inverse(&self) -> RigidMotion<To, From> {
        RigidMotion::new(
            self.rigid_transformation.inverse(),
            -self
                .rigid_transformation
                .rotation()
                .apply_bivector(&self.angular_velocity_of_to_frame),
            self.apply(&DegreesOfFreedom::origin_at_rest()).velocity,
        )
    }

    pub fn rigid_transformation(&self) -> &RigidTransformation<From, To> {
        &self.rigid_transformation
    }

    pub fn rotation(&self) -> &Rotation<From, To> {
        self.rigid_transformation.rotation()
    }

    /// Angular velocity of `To` as seen from `From`.
    pub fn angular_velocity_of_to_frame(&self) -> AngularVelocity<From> {
        self.angular_velocity_of_to_frame
    }

    pub fn velocity_of_to_frame_origin(&self) -> Velocity<From> {
        self.velocity_of_to_frame_origin
    }
}

impl<A: Frame, B: Frame, C: Frame> Mul<RigidMotion<A, B>> for RigidMotion<B, C> {
    type Output = RigidMotion<A, C>;

    fn mul(self, rhs: RigidMotion<A, B>) -> RigidMotion<A, C> {
        let velocity_of_c_origin_in_a = rhs
            .inverse()
            .apply(&self.inverse().apply(&DegreesOfFreedom::origin_at_rest()))
            .velocity;
        RigidMotion::new(
            self.rigid_transformation * rhs.rigid_transformation,
            rhs.angular_velocity_of_to_frame
                + rhs
                    .rotation()
                    .inverse()
                    .apply_bivector(&self.angular_velocity_of_to_frame),
            velocity_of_c_origin_in_a,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Barycentric, Icrs};
    use crate::grassmann::{Displacement, Vector};
    use approx::assert_relative_eq;
    use nbody_quantities::si::*;
    use nbody_quantities::Quantity;

    crate::declare_frame!(struct Rotating);

    fn comoving_motion() -> RigidMotion<Barycentric, Icrs> {
        RigidMotion::non_rotating(DegreesOfFreedom::new(
            Position::new(metres(10.0), metres(0.0), metres(0.0)),
            Velocity::new(
                metres_per_second(1.0),
                metres_per_second(0.0),
                metres_per_second(0.0),
            ),
        ))
    }

    #[test]
    fn non_rotating_motion_subtracts_centre_state() {
        let motion = comoving_motion();
        let dof = DegreesOfFreedom::new(
            Position::new(metres(12.0), metres(3.0), metres(0.0)),
            Velocity::new(
                metres_per_second(1.0),
                metres_per_second(2.0),
                metres_per_second(0.0),
            ),
        );
        let mapped = motion.apply(&dof);
        assert_eq!(
            mapped.position.displacement_from_origin(),
            Displacement::new(metres(2.0), metres(3.0), metres(0.0))
        );
        assert_eq!(
            mapped.velocity,
            Velocity::new(
                metres_per_second(0.0),
                metres_per_second(2.0),
                metres_per_second(0.0)
            )
        );
    }

    #[test]
    fn inverse_round_trips_degrees_of_freedom() {
        let motion: RigidMotion<Barycentric, Rotating> = RigidMotion::new(
            RigidTransformation::new(
                Position::new(metres(1.0), metres(-2.0), metres(0.5)),
                Position::origin(),
                Rotation::from_axis_angle(degrees(30.0), &Vector::new(0.0, 1.0, 1.0)),
            ),
            AngularVelocity::new(
                radians_per_second(0.1),
                radians_per_second(0.0),
                radians_per_second(0.4),
            ),
            Velocity::new(
                metres_per_second(5.0),
                metres_per_second(-1.0),
                metres_per_second(0.0),
            ),
        );
        let dof = DegreesOfFreedom::new(
            Position::new(metres(3.0), metres(4.0), metres(5.0)),
            Velocity::new(
                metres_per_second(-1.0),
                metres_per_second(2.0),
                metres_per_second(3.0),
            ),
        );
        let back = motion.inverse().apply(&motion.apply(&dof));
        let dp = back.position - dof.position;
        let dv = back.velocity - dof.velocity;
        assert_relative_eq!(dp.norm().si(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(dv.norm().si(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn composition_matches_sequential_application() {
        let first: RigidMotion<Barycentric, Icrs> = comoving_motion();
        let second: RigidMotion<Icrs, Rotating> = RigidMotion::new(
            RigidTransformation::new(
                Position::new(metres(0.0), metres(1.0), metres(0.0)),
                Position::origin(),
                Rotation::from_axis_angle(degrees(45.0), &Vector::new(0.0, 0.0, 1.0)),
            ),
            AngularVelocity::new(
                radians_per_second(0.0),
                radians_per_second(0.0),
                radians_per_second(1.0),
            ),
            Velocity::zero(),
        );
        let dof = DegreesOfFreedom::new(
            Position::new(metres(7.0), metres(8.0), metres(9.0)),
            Velocity::new(
                metres_per_second(0.3),
                metres_per_second(0.2),
                metres_per_second(0.1),
            ),
        );
        let composed = (second * first).apply(&dof);
        let sequential = second.apply(&first.apply(&dof));
        let dp = composed.position - sequential.position;
        let dv = composed.velocity - sequential.velocity;
        assert_relative_eq!(dp.norm().si(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(dv.norm().si(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn rotating_motion_adds_angular_term() {
        // A frame rotating at 1 rad/s about z, coincident origins: a point
        // fixed at x = 1 m in `From` moves at −1 m/s along y in `To`.
        let motion: RigidMotion<Barycentric, Rotating> = RigidMotion::new(
            RigidTransformation::identity(),
            AngularVelocity::new(
                radians_per_second(0.0),
                radians_per_second(0.0),
                radians_per_second(1.0),
            ),
            Velocity::zero(),
        );
        let dof = DegreesOfFreedom::new(
            Position::new(metres(1.0), metres(0.0), metres(0.0)),
            Velocity::zero(),
        );
        let mapped = motion.apply(&dof);
        assert_relative_eq!(mapped.velocity.y().si(), -1.0, epsilon = 1e-15);
    }
}
