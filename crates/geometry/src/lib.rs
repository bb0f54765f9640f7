//! Geometric primitives for the N-body core.
//!
//! Reference frames are phantom type tags: a `Velocity<Barycentric>` and a
//! `Velocity<RigidPart>` are different types, and the only ways across are
//! explicit maps ([`Identity`], [`Rotation`], [`RigidMotion`]) whose
//! endpoints must match at compile time.

mod frame;
mod grassmann;
mod inertia;
mod point;
mod rigid_motion;
mod rotation;

pub use frame::{Barycentric, Frame, Icrs, Identity};
pub use grassmann::{
    AccelerationVector, AngularMomentumBivector, AngularVelocity, Bivector, Displacement,
    ForceVector, TorqueBivector, Vector, Velocity, dot, wedge,
};
pub use inertia::InertiaTensor;
pub use point::{BarycentreCalculator, DegreesOfFreedom, Position};
pub use rigid_motion::{RigidMotion, RigidTransformation};
pub use rotation::Rotation;
