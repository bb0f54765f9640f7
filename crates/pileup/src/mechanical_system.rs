//! A collection of rigid bodies treated as one mechanical system.

use std::marker::PhantomData;

use crate::pile_up::RigidPart;
use nbody_geometry::{
    AngularMomentumBivector, BarycentreCalculator, DegreesOfFreedom, Frame, Identity,
    InertiaTensor, RigidMotion, wedge,
};
use nbody_quantities::Mass;

/// Accumulates rigid bodies given in frame `In` and exposes the aggregate
/// quantities in the non-rotating system frame `System` centred at the
/// common centre of mass.
pub struct MechanicalSystem<In: Frame, System: Frame> {
    bodies: Vec<(RigidMotion<RigidPart, In>, Mass, InertiaTensor<RigidPart>)>,
    phantom: PhantomData<System>,
}

impl<In: Frame, System: Frame> MechanicalSystem<In, System> {
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            phantom: PhantomData,
        }
    }

    pub fn add_rigid_body(
        &mut self,
        motion: RigidMotion<RigidPart, In>,
        mass: Mass,
        inertia_tensor: InertiaTensor<RigidPart>,
    ) {
        self.bodies.push((motion, mass, inertia_tensor));
    }

    pub fn mass(&self) -> Mass {
        self.bodies.iter().map(|(_, mass, _)| *mass).sum()
    }

    pub fn centre_of_mass(&self) -> DegreesOfFreedom<In> {
        let mut barycentre = BarycentreCalculator::new();
        for (motion, mass, _) in &self.bodies {
            barycentre.add(&motion.apply(&DegreesOfFreedom::origin_at_rest()), *mass);
        }
        barycentre.get()
    }

    /// The non-rotating motion of the system frame: its origin rides the
    /// centre of mass.
    pub fn linear_motion(&self) -> RigidMotion<System, In> {
        RigidMotion::<In, System>::non_rotating(self.centre_of_mass()).inverse()
    }

    /// Angular momentum about the centre of mass: the orbital terms of the
    /// body centres plus each body's spin.
    pub fn angular_momentum(&self) -> AngularMomentumBivector<System> {
        let com = self.centre_of_mass();
        let relabel = Identity::<In, System>::new();
        let mut total = AngularMomentumBivector::<In>::zero();
        for (motion, mass, inertia) in &self.bodies {
            let dof = motion.apply(&DegreesOfFreedom::origin_at_rest());
            let r = dof.position - com.position;
            let relative_velocity = dof.velocity - com.velocity;
            total += wedge(&r, &(relative_velocity * *mass));
            let spin = motion.inverse().angular_velocity_of_to_frame();
            total += inertia.rotate(motion.rotation()).apply(&spin);
        }
        relabel.map_bivector(&total)
    }

    /// The inertia tensor about the centre of mass: rotated body tensors
    /// plus the point-mass parallel-axis terms.
    pub fn inertia_tensor(&self) -> InertiaTensor<System> {
        let com = self.centre_of_mass();
        let relabel = Identity::<In, System>::new();
        let mut total = InertiaTensor::<In>::zero();
        for (motion, mass, inertia) in &self.bodies {
            let dof = motion.apply(&DegreesOfFreedom::origin_at_rest());
            let r = dof.position - com.position;
            total += inertia.rotate(motion.rotation());
            total += InertiaTensor::point_mass(*mass, &r);
        }
        relabel.map_inertia(&total)
    }
}

impl<In: Frame, System: Frame> Default for MechanicalSystem<In, System> {
    fn default() -> Self {
        Self::new()
    }
}
