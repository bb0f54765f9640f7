//! Pile-ups: the mechanical aggregation of touching parts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::mechanical_system::MechanicalSystem;
use crate::part::{Part, PartId};
use nbody_geometry::{
    AngularMomentumBivector, AngularVelocity, Barycentric, DegreesOfFreedom, ForceVector, Identity,
    Position, RigidMotion, RigidTransformation, Rotation, TorqueBivector, Velocity, declare_frame,
    wedge,
};
use nbody_numerics::{
    AdaptiveStepIntegrator, AdaptiveStepParameters, FixedStepIntegrator, FixedStepParameters,
    FlowOutcome,
};
use nbody_physics::{Ephemeris, FixedStepInstance, no_intrinsic_acceleration};
use nbody_quantities::si::{metres, metres_per_second, seconds};
use nbody_quantities::{Instant, Mass};
use nbody_trajectory::{DiscreteTrajectory, ForkId};

declare_frame!(
    /// The body frame of a rigid part.
    pub struct RigidPart
);
declare_frame!(
    /// The game-supplied frame in which apparent part motions arrive.
    pub struct ApparentBubble
);
declare_frame!(
    /// The non-rotating frame riding a pile-up's centre of mass.
    pub struct NonRotatingPileUp
);
declare_frame!(
    /// The non-rotating frame riding the apparent centre of mass.
    struct ApparentPileUp
);
declare_frame!(
    /// The frame in which a rigid body with the pile-up's inertia and
    /// angular momentum is immobile.
    struct EquivalentRigidPileUp
);

/// Fixed-step parameters used when a message carries none.
pub fn default_history_parameters() -> FixedStepParameters {
    FixedStepParameters::new(
        FixedStepIntegrator::McLachlanAtela1992Order5Optimal,
        seconds(10.0),
    )
}

/// Adaptive-step parameters used when a message carries none.
pub fn default_psychohistory_parameters() -> AdaptiveStepParameters {
    AdaptiveStepParameters::new(
        AdaptiveStepIntegrator::DormandElMikkawyPrince1986Rkn434Fm,
        1000,
        metres(1e-3),
        metres_per_second(1e-6),
    )
}

/// A group of colliding or docked parts, integrated as a single point mass
/// while the authoritative angular momentum is enforced against the
/// game-supplied apparent part motions.
pub struct PileUp {
    parts: Vec<Part>,
    history: DiscreteTrajectory<Barycentric>,
    /// Fork of `history` holding the non-authoritative forward
    /// extrapolation.
    psychohistory: ForkId,
    angular_momentum: AngularMomentumBivector<NonRotatingPileUp>,
    mass: Mass,
    intrinsic_force: ForceVector<Barycentric>,
    intrinsic_torque: TorqueBivector<NonRotatingPileUp>,
    angular_momentum_change_rate: TorqueBivector<NonRotatingPileUp>,
    actual_part_rigid_motion: BTreeMap<PartId, RigidMotion<RigidPart, NonRotatingPileUp>>,
    apparent_part_rigid_motion: BTreeMap<PartId, RigidMotion<RigidPart, ApparentBubble>>,
    adaptive_step_parameters: AdaptiveStepParameters,
    fixed_step_parameters: FixedStepParameters,
    fixed_instance: Option<FixedStepInstance<Barycentric>>,
    conserve_angular_momentum: bool,
    deletion_callback: Option<Box<dyn FnOnce() + Send>>,
}

impl PileUp {
    pub fn new(
        parts: Vec<Part>,
        t: Instant,
        adaptive_step_parameters: AdaptiveStepParameters,
        fixed_step_parameters: FixedStepParameters,
        conserve_angular_momentum: bool,
        deletion_callback: Option<Box<dyn FnOnce() + Send>>,
    ) -> Self {
        assert!(!parts.is_empty(), "a pile-up needs at least one part");
        info!("constructing a pile-up of {} parts", parts.len());
        let mut system = MechanicalSystem::<Barycentric, NonRotatingPileUp>::new();
        for part in &parts {
            system.add_rigid_body(*part.rigid_motion(), part.mass(), *part.inertia_tensor());
        }
        let barycentre = system.centre_of_mass();
        let angular_momentum = system.angular_momentum();
        let barycentric_to_pile_up = system.linear_motion().inverse();

        let mut history = DiscreteTrajectory::new();
        history.append(ForkId::ROOT, t, barycentre);
        let psychohistory = history.new_fork_at_last(ForkId::ROOT);

        let actual_part_rigid_motion = parts
            .iter()
            .map(|part| (part.id(), barycentric_to_pile_up * *part.rigid_motion()))
            .collect();

        let mut pile_up = Self {
            parts,
            history,
            psychohistory,
            angular_momentum,
            mass: Mass::ZERO,
            intrinsic_force: ForceVector::zero(),
            intrinsic_torque: TorqueBivector::zero(),
            angular_momentum_change_rate: TorqueBivector::zero(),
            actual_part_rigid_motion,
            apparent_part_rigid_motion: BTreeMap::new(),
            adaptive_step_parameters,
            fixed_step_parameters,
            fixed_instance: None,
            conserve_angular_momentum,
            deletion_callback,
        };
        pile_up.recompute_from_parts();
        pile_up
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn part(&self, id: PartId) -> Option<&Part> {
        self.parts.iter().find(|part| part.id() == id)
    }

    pub fn part_mut(&mut self, id: PartId) -> Option<&mut Part> {
        self.parts.iter_mut().find(|part| part.id() == id)
    }

    pub fn mass(&self) -> Mass {
        self.mass
    }

    pub fn angular_momentum(&self) -> AngularMomentumBivector<NonRotatingPileUp> {
        self.angular_momentum
    }

    pub fn history(&self) -> &DiscreteTrajectory<Barycentric> {
        &self.history
    }

    pub fn psychohistory(&self) -> ForkId {
        self.psychohistory
    }

    pub fn actual_part_rigid_motion(
        &self,
        id: PartId,
    ) -> &RigidMotion<RigidPart, NonRotatingPileUp> {
        &self.actual_part_rigid_motion[&id]
    }

    /// Registers the game-supplied motion of one part for this tick.
    /// Registering a part twice is a programmer error.
    pub fn set_part_apparent_rigid_motion(
        &mut self,
        id: PartId,
        motion: RigidMotion<RigidPart, ApparentBubble>,
    ) {
        assert!(
            self.part(id).is_some(),
            "part {id} does not belong to this pile-up"
        );
        let previous = self.apparent_part_rigid_motion.insert(id, motion);
        assert!(previous.is_none(), "duplicate apparent motion for part {id}");
    }

    /// One tick: deform to enforce the stored angular momentum against the
    /// apparent motions, advance the centre of mass to `t`, and push the
    /// resulting rigid motions back to the parts. The ephemeris must
    /// already cover `t`.
    pub fn deform_and_advance_time(
        &mut self,
        t: Instant,
        ephemeris: &Ephemeris<Barycentric>,
    ) -> FlowOutcome {
        let (last, _) = self
            .history
            .back(self.psychohistory)
            .expect("a pile-up's history is never empty");
        if last >= t {
            return FlowOutcome::ReachedFinalTime;
        }
        self.deform_pile_up_if_needed();
        self.recompute_from_parts();
        let outcome = self.advance_time(t, ephemeris);
        self.nudge_parts();
        outcome
    }

    /// Recomputes the aggregate mass, intrinsic force and torque, and the
    /// angular-momentum change rate due to mass loss, from the parts and
    /// their actual motions.
    fn recompute_from_parts(&mut self) {
        self.mass = Mass::ZERO;
        self.intrinsic_force = ForceVector::zero();
        self.intrinsic_torque = TorqueBivector::zero();
        self.angular_momentum_change_rate = TorqueBivector::zero();
        let to_pile_up = Identity::<Barycentric, NonRotatingPileUp>::new();
        for part in &self.parts {
            self.mass += part.mass();
            self.intrinsic_force += part.intrinsic_force();

            let part_motion = &self.actual_part_rigid_motion[&part.id()];
            let part_dof = part_motion.apply(&DegreesOfFreedom::origin_at_rest());
            let r = part_dof.position.displacement_from_origin();
            self.intrinsic_torque +=
                wedge(&r, &to_pile_up.map_vector(&part.intrinsic_force()))
                    + to_pile_up.map_bivector(&part.intrinsic_torque());

            // The game scales the inertia tensor with the mass, as if the
            // density changed uniformly.
            let spin = part_motion.inverse().angular_velocity_of_to_frame();
            let spin_momentum = part
                .inertia_tensor()
                .rotate(part_motion.rotation())
                .apply(&spin);
            self.angular_momentum_change_rate +=
                wedge(&r, &(part_dof.velocity * part.mass_change()))
                    + spin_momentum / (part.mass() / part.mass_change());
        }
    }

    /// Corrects the apparent motions so that their linear content and
    /// shape are kept but the rotational state realizes the authoritative
    /// angular momentum.
    fn deform_pile_up_if_needed(&mut self) {
        if self.apparent_part_rigid_motion.is_empty() {
            return;
        }
        assert_eq!(
            self.apparent_part_rigid_motion.len(),
            self.parts.len(),
            "apparent motions were not set for every part"
        );

        let mut apparent_system = MechanicalSystem::<ApparentBubble, ApparentPileUp>::new();
        for (id, motion) in &self.apparent_part_rigid_motion {
            let part = self.part(*id).expect("apparent motions map known parts");
            apparent_system.add_rigid_body(*motion, part.mass(), *part.inertia_tensor());
        }
        let apparent_angular_momentum = apparent_system.angular_momentum();
        // The inertia tensor is about the centre of mass, so the rigid
        // apparent-bubble-to-pile-up correction leaves it unchanged.
        let inertia_tensor = apparent_system.inertia_tensor();
        let apparent_equivalent_angular_velocity = inertia_tensor.solve(&apparent_angular_momentum);
        let actual_equivalent_angular_velocity = Identity::<ApparentPileUp, NonRotatingPileUp>::new()
            .map_inertia(&inertia_tensor)
            .solve(&self.angular_momentum);

        // In the equivalent-rigid-pile-up frame, a rigid body with the
        // inertia and angular momentum of the pile-up is immobile; going
        // through it replaces the apparent rotational state with the one
        // realizing the authoritative angular momentum.
        let apparent_equivalent_rotation: RigidMotion<ApparentPileUp, EquivalentRigidPileUp> =
            RigidMotion::new(
                RigidTransformation::new(Position::origin(), Position::origin(), Rotation::identity()),
                if self.conserve_angular_momentum {
                    apparent_equivalent_angular_velocity
                } else {
                    AngularVelocity::zero()
                },
                Velocity::zero(),
            );
        let actual_equivalent_rotation: RigidMotion<NonRotatingPileUp, EquivalentRigidPileUp> =
            RigidMotion::new(
                RigidTransformation::new(Position::origin(), Position::origin(), Rotation::identity()),
                if self.conserve_angular_momentum {
                    actual_equivalent_angular_velocity
                } else {
                    AngularVelocity::zero()
                },
                Velocity::zero(),
            );
        let apparent_bubble_to_pile_up = actual_equivalent_rotation.inverse()
            * apparent_equivalent_rotation
            * apparent_system.linear_motion().inverse();

        debug!(
            "deformation: rotational correction {}, angular momentum error {}, ω apparent {}",
            (actual_equivalent_rotation.inverse() * apparent_equivalent_rotation)
                .angular_velocity_of_to_frame()
                .norm(),
            (Identity::<ApparentPileUp, NonRotatingPileUp>::new()
                .map_bivector(&apparent_angular_momentum)
                - self.angular_momentum)
                .norm(),
            apparent_equivalent_angular_velocity.norm()
        );

        self.actual_part_rigid_motion.clear();
        for (id, apparent_motion) in &self.apparent_part_rigid_motion {
            self.actual_part_rigid_motion
                .insert(*id, apparent_bubble_to_pile_up * *apparent_motion);
        }
        self.apparent_part_rigid_motion.clear();
    }

    /// Integrates the centre of mass up to `t`, growing the authoritative
    /// history (fixed step while coasting, adaptive under thrust) and
    /// recreating the psychohistory at the last authoritative sample.
    fn advance_time(&mut self, t: Instant, ephemeris: &Ephemeris<Barycentric>) -> FlowOutcome {
        let (last_time, _) = self
            .history
            .back(self.psychohistory)
            .expect("a pile-up's history is never empty");
        let elapsed = t - last_time;
        self.angular_momentum += self.intrinsic_torque * elapsed
            + self.angular_momentum_change_rate * elapsed;

        let mut outcome = FlowOutcome::ReachedFinalTime;
        if self.intrinsic_force == ForceVector::zero() {
            // Coasting: drop the non-authoritative tail and extend the
            // history with the reusable fixed-step instance; any remainder
            // to t becomes the new psychohistory.
            self.history.delete_fork(self.psychohistory);
            if self.fixed_instance.is_none() {
                self.fixed_instance = Some(ephemeris.new_instance(
                    &self.history,
                    ForkId::ROOT,
                    self.fixed_step_parameters,
                ));
            }
            let instance = self.fixed_instance.as_mut().expect("just created");
            ephemeris.flow_with_fixed_step(t, instance, &mut self.history, ForkId::ROOT);
            self.psychohistory = self.history.new_fork_at_last(ForkId::ROOT);
            let (reached, _) = self.history.back(ForkId::ROOT).expect("history is non-empty");
            if reached < t {
                outcome = ephemeris.flow_with_adaptive_step(
                    &mut self.history,
                    self.psychohistory,
                    no_intrinsic_acceleration,
                    t,
                    &self.adaptive_step_parameters,
                );
            }
        } else {
            // Under thrust the fixed instance would integrate the wrong
            // flow; it is recreated on the next coasting tick.
            self.fixed_instance = None;
            // The psychohistory becomes authoritative before integrating
            // on top of it.
            let fork_time = self
                .history
                .fork_time(self.psychohistory)
                .expect("the psychohistory is a fork");
            let tail: Vec<_> = self
                .history
                .iter(self.psychohistory)
                .filter(|(time, _)| *time > fork_time)
                .copied()
                .collect();
            self.history.delete_fork(self.psychohistory);
            for (time, dof) in tail {
                self.history.append(ForkId::ROOT, time, dof);
            }
            let acceleration = self.intrinsic_force / self.mass;
            outcome = ephemeris.flow_with_adaptive_step(
                &mut self.history,
                ForkId::ROOT,
                move |_t| acceleration,
                t,
                &self.adaptive_step_parameters,
            );
            self.psychohistory = self.history.new_fork_at_last(ForkId::ROOT);
        }

        let fork_time = self
            .history
            .fork_time(self.psychohistory)
            .expect("the psychohistory is a fork");
        self.history.forget_before(ForkId::ROOT, fork_time);
        outcome
    }

    /// Recomputes every part's barycentric rigid motion from the
    /// just-integrated centre of mass and the actual part motions.
    fn nudge_parts(&mut self) {
        let (_, centre) = self
            .history
            .back(self.psychohistory)
            .expect("a pile-up's history is never empty");
        let pile_up_to_barycentric =
            RigidMotion::<Barycentric, NonRotatingPileUp>::non_rotating(centre).inverse();
        for part in &mut self.parts {
            let actual = self.actual_part_rigid_motion[&part.id()];
            part.set_rigid_motion(pile_up_to_barycentric * actual);
        }
    }

    pub fn write_to_message(&self) -> PileUpMessage {
        PileUpMessage {
            part_ids: self.parts.iter().map(Part::id).collect(),
            history: self.history.clone(),
            psychohistory: Some(self.psychohistory),
            angular_momentum: self.angular_momentum,
            actual_part_rigid_motion: self.actual_part_rigid_motion.clone(),
            apparent_part_rigid_motion: self.apparent_part_rigid_motion.clone(),
            actual_part_degrees_of_freedom: BTreeMap::new(),
            apparent_part_degrees_of_freedom: BTreeMap::new(),
            adaptive_step_parameters: Some(self.adaptive_step_parameters),
            fixed_step_parameters: Some(self.fixed_step_parameters),
            conserve_angular_momentum: self.conserve_angular_momentum,
        }
    }

    /// Rebuilds a pile-up from a message, applying the documented
    /// compatibility rules: absent step parameters mean the defaults, a
    /// history without a fork is rewritten into (history, psychohistory),
    /// and per-part degrees of freedom are promoted to non-rotating rigid
    /// motions.
    pub fn read_from_message(
        message: PileUpMessage,
        part_lookup: impl Fn(PartId) -> Option<Part>,
        deletion_callback: Option<Box<dyn FnOnce() + Send>>,
    ) -> Result<Self, PileUpReadError> {
        let mut parts = Vec::with_capacity(message.part_ids.len());
        for id in &message.part_ids {
            parts.push(part_lookup(*id).ok_or(PileUpReadError::UnknownPart { id: *id })?);
        }
        if parts.is_empty() {
            return Err(PileUpReadError::NoParts);
        }

        let mut history = message.history;
        if history.is_empty(ForkId::ROOT) {
            return Err(PileUpReadError::EmptyHistory);
        }
        let psychohistory = match message.psychohistory {
            Some(fork) => fork,
            None => {
                // An old-style history: a trailing second sample is the
                // non-authoritative extrapolation and becomes the fork.
                if history.size(ForkId::ROOT) == 2 {
                    let (begin, _) = history.front(ForkId::ROOT).expect("non-empty");
                    let fork = history.new_fork_with_copy(ForkId::ROOT, begin);
                    history.forget_after(ForkId::ROOT, begin);
                    fork
                } else {
                    history.new_fork_at_last(ForkId::ROOT)
                }
            }
        };

        let adaptive_step_parameters = message
            .adaptive_step_parameters
            .unwrap_or_else(default_psychohistory_parameters);
        let fixed_step_parameters = message
            .fixed_step_parameters
            .unwrap_or_else(default_history_parameters);

        let mut actual_part_rigid_motion = message.actual_part_rigid_motion;
        let mut apparent_part_rigid_motion = message.apparent_part_rigid_motion;
        for (id, dof) in message.actual_part_degrees_of_freedom {
            actual_part_rigid_motion.insert(id, RigidMotion::non_rotating_from_target(dof));
        }
        for (id, dof) in message.apparent_part_degrees_of_freedom {
            apparent_part_rigid_motion.insert(id, RigidMotion::non_rotating_from_target(dof));
        }
        for part in &parts {
            if !actual_part_rigid_motion.contains_key(&part.id()) {
                return Err(PileUpReadError::MissingActualMotion { id: part.id() });
            }
        }

        let mut pile_up = Self {
            parts,
            history,
            psychohistory,
            angular_momentum: message.angular_momentum,
            mass: Mass::ZERO,
            intrinsic_force: ForceVector::zero(),
            intrinsic_torque: TorqueBivector::zero(),
            angular_momentum_change_rate: TorqueBivector::zero(),
            actual_part_rigid_motion,
            apparent_part_rigid_motion,
            adaptive_step_parameters,
            fixed_step_parameters,
            fixed_instance: None,
            conserve_angular_momentum: message.conserve_angular_momentum,
            deletion_callback,
        };
        pile_up.recompute_from_parts();
        Ok(pile_up)
    }
}

impl Drop for PileUp {
    fn drop(&mut self) {
        info!("destroying a pile-up of {} parts", self.parts.len());
        if let Some(callback) = self.deletion_callback.take() {
            callback();
        }
    }
}

/// The serialized form of a pile-up. Parts are stored by id and resolved
/// by the host on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PileUpMessage {
    pub part_ids: Vec<PartId>,
    pub history: DiscreteTrajectory<Barycentric>,
    /// Absent in old messages; the history is then rewritten on load.
    #[serde(default)]
    pub psychohistory: Option<ForkId>,
    #[serde(default)]
    pub angular_momentum: AngularMomentumBivector<NonRotatingPileUp>,
    #[serde(default)]
    pub actual_part_rigid_motion: BTreeMap<PartId, RigidMotion<RigidPart, NonRotatingPileUp>>,
    #[serde(default)]
    pub apparent_part_rigid_motion: BTreeMap<PartId, RigidMotion<RigidPart, ApparentBubble>>,
    /// Older messages stored plain degrees of freedom per part; they are
    /// promoted to non-rotating motions on load.
    #[serde(default)]
    pub actual_part_degrees_of_freedom: BTreeMap<PartId, DegreesOfFreedom<NonRotatingPileUp>>,
    #[serde(default)]
    pub apparent_part_degrees_of_freedom: BTreeMap<PartId, DegreesOfFreedom<ApparentBubble>>,
    /// Absent in the oldest messages; defaults are used.
    #[serde(default)]
    pub adaptive_step_parameters: Option<AdaptiveStepParameters>,
    #[serde(default)]
    pub fixed_step_parameters: Option<FixedStepParameters>,
    #[serde(default)]
    pub conserve_angular_momentum: bool,
}

/// Failures while rebuilding a pile-up from a message.
#[derive(Debug, Error)]
pub enum PileUpReadError {
    #[error("part {id} is not known to the host")]
    UnknownPart { id: PartId },
    #[error("a pile-up message must name at least one part")]
    NoParts,
    #[error("a pile-up message must carry a non-empty history")]
    EmptyHistory,
    #[error("no actual rigid motion for part {id}")]
    MissingActualMotion { id: PartId },
}
