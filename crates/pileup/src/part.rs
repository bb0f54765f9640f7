//! Rigid body fragments.

use serde::{Deserialize, Serialize};

use crate::pile_up::RigidPart;
use nbody_geometry::{
    Barycentric, DegreesOfFreedom, ForceVector, InertiaTensor, RigidMotion, TorqueBivector,
};
use nbody_quantities::{Mass, MassRate};

pub type PartId = u32;

/// A rigid fragment of a vessel: mass, inertia, the intrinsic force and
/// torque imposed on it (engines, reaction wheels), its mass-change rate,
/// and its rigid motion in the barycentric frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    id: PartId,
    name: String,
    mass: Mass,
    inertia_tensor: InertiaTensor<RigidPart>,
    intrinsic_force: ForceVector<Barycentric>,
    intrinsic_torque: TorqueBivector<Barycentric>,
    mass_change: MassRate,
    rigid_motion: RigidMotion<RigidPart, Barycentric>,
}

impl Part {
    pub fn new(
        id: PartId,
        name: impl Into<String>,
        mass: Mass,
        inertia_tensor: InertiaTensor<RigidPart>,
        rigid_motion: RigidMotion<RigidPart, Barycentric>,
    ) -> Self {
        assert!(mass > Mass::ZERO, "parts need a positive mass");
        Self {
            id,
            name: name.into(),
            mass,
            inertia_tensor,
            intrinsic_force: ForceVector::zero(),
            intrinsic_torque: TorqueBivector::zero(),
            mass_change: MassRate::ZERO,
            rigid_motion,
        }
    }

    pub fn id(&self) -> PartId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mass(&self) -> Mass {
        self.mass
    }

    pub fn inertia_tensor(&self) -> &InertiaTensor<RigidPart> {
        &self.inertia_tensor
    }

    pub fn intrinsic_force(&self) -> ForceVector<Barycentric> {
        self.intrinsic_force
    }

    pub fn intrinsic_torque(&self) -> TorqueBivector<Barycentric> {
        self.intrinsic_torque
    }

    pub fn mass_change(&self) -> MassRate {
        self.mass_change
    }

    pub fn rigid_motion(&self) -> &RigidMotion<RigidPart, Barycentric> {
        &self.rigid_motion
    }

    /// State of the part's centre of mass in the barycentric frame.
    pub fn degrees_of_freedom(&self) -> DegreesOfFreedom<Barycentric> {
        self.rigid_motion.apply(&DegreesOfFreedom::origin_at_rest())
    }

    pub fn set_mass(&mut self, mass: Mass) {
        assert!(mass > Mass::ZERO, "parts need a positive mass");
        self.mass = mass;
    }

    pub fn set_intrinsic_force(&mut self, force: ForceVector<Barycentric>) {
        self.intrinsic_force = force;
    }

    pub fn set_intrinsic_torque(&mut self, torque: TorqueBivector<Barycentric>) {
        self.intrinsic_torque = torque;
    }

    pub fn set_mass_change(&mut self, mass_change: MassRate) {
        self.mass_change = mass_change;
    }

    pub fn set_rigid_motion(&mut self, rigid_motion: RigidMotion<RigidPart, Barycentric>) {
        self.rigid_motion = rigid_motion;
    }

    pub fn clear_intrinsic_force_and_torque(&mut self) {
        self.intrinsic_force = ForceVector::zero();
        self.intrinsic_torque = TorqueBivector::zero();
    }
}
