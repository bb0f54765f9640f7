//! The ephemeris engine: fixed-step integration of the massive bodies,
//! continuous trajectories for random-time queries, and adaptive flows of
//! massless followers against the frozen ephemeris.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::body::MassiveBody;
use crate::gravity::{degree_two_zonal_acceleration, point_mass_acceleration};
use nbody_geometry::{AccelerationVector, DegreesOfFreedom, Frame, Position};
use nbody_numerics::{
    AdaptiveStepParameters, FixedStepParameters, FlowOutcome, SystemState, flow_embedded_rkn,
    step_symplectic,
};
use nbody_quantities::{Instant, Length};
use nbody_trajectory::{ContinuousTrajectory, DiscreteTrajectory, ForkId};

/// The absence of intrinsic acceleration, for flows of inert bodies.
pub fn no_intrinsic_acceleration<F: Frame>(_t: Instant) -> AccelerationVector<F> {
    AccelerationVector::zero()
}

/// A client fixed-step integration, created against an ephemeris and
/// advanced by [`Ephemeris::flow_with_fixed_step`]. Cached by callers and
/// reused across calls so that `t_n = t_0 + n·h` exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct FixedStepInstance<F: Frame> {
    parameters: FixedStepParameters,
    state: SystemState<F>,
}

impl<F: Frame> FixedStepInstance<F> {
    pub fn time(&self) -> Instant {
        self.state.time()
    }
}

/// Owns the massive bodies and one continuous trajectory per body, all
/// covering the same interval `[t_min, t_max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Ephemeris<F: Frame> {
    bodies: Vec<MassiveBody<F>>,
    trajectories: Vec<ContinuousTrajectory<F>>,
    parameters: FixedStepParameters,
    fitting_tolerance: Length,
    epoch: Instant,
    state: SystemState<F>,
}

impl<F: Frame> Ephemeris<F> {
    /// Builds an ephemeris from bodies and their initial states at `epoch`
    /// and integrates far enough that the epoch itself is covered.
    pub fn new(
        bodies: Vec<MassiveBody<F>>,
        initial_states: Vec<DegreesOfFreedom<F>>,
        epoch: Instant,
        fitting_tolerance: Length,
        parameters: FixedStepParameters,
    ) -> Self {
        assert!(!bodies.is_empty(), "an ephemeris needs at least one body");
        assert_eq!(
            bodies.len(),
            initial_states.len(),
            "one initial state per body"
        );
        let state = SystemState::new(epoch, &initial_states);
        let mut trajectories: Vec<ContinuousTrajectory<F>> = bodies
            .iter()
            .map(|_| ContinuousTrajectory::new(fitting_tolerance))
            .collect();
        for (i, trajectory) in trajectories.iter_mut().enumerate() {
            trajectory.append(epoch, state.degrees_of_freedom(i));
        }
        let mut ephemeris = Self {
            bodies,
            trajectories,
            parameters,
            fitting_tolerance,
            epoch,
            state,
        };
        ephemeris.prolong(epoch);
        ephemeris
    }

    pub fn bodies(&self) -> &[MassiveBody<F>] {
        &self.bodies
    }

    pub fn body_index(&self, name: &str) -> Option<usize> {
        self.bodies.iter().position(|body| body.name() == name)
    }

    pub fn trajectory(&self, index: usize) -> &ContinuousTrajectory<F> {
        &self.trajectories[index]
    }

    pub fn fitting_tolerance(&self) -> Length {
        self.fitting_tolerance
    }

    pub fn parameters(&self) -> &FixedStepParameters {
        &self.parameters
    }

    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    pub fn t_min(&self) -> Instant {
        self.trajectories[0]
            .t_min()
            .expect("construction covers the epoch")
    }

    /// The least upper bound of the interval covered by every body.
    pub fn t_max(&self) -> Instant {
        self.trajectories[0]
            .t_max()
            .expect("construction covers the epoch")
    }

    /// Advances the fixed-step integration until every trajectory covers
    /// `t`. Idempotent; `t_max` never decreases.
    pub fn prolong(&mut self, t: Instant) {
        assert!(
            t >= self.epoch,
            "cannot prolong to {t}, before the starting epoch {}",
            self.epoch
        );
        let mut steps = 0u64;
        while self.coverage().is_none_or(|covered| covered < t) {
            self.step_once();
            steps += 1;
        }
        if steps > 0 {
            debug!(
                "prolonged the ephemeris by {steps} steps, covering [{}, {}]",
                self.t_min(),
                self.t_max()
            );
        }
    }

    /// Gravitational acceleration of all bodies on a massless follower at
    /// `position`, read from the covered trajectories.
    pub fn compute_gravitational_acceleration(
        &self,
        position: &Position<F>,
        t: Instant,
    ) -> AccelerationVector<F> {
        let mut acceleration = AccelerationVector::<F>::zero();
        for (body, trajectory) in self.bodies.iter().zip(&self.trajectories) {
            let body_position = trajectory.evaluate_position(t);
            let r = *position - body_position;
            acceleration += point_mass_acceleration(body.gravitational_parameter(), &r);
            if let Some(oblateness) = body.oblateness() {
                acceleration +=
                    degree_two_zonal_acceleration(oblateness, body.gravitational_parameter(), &r);
            }
        }
        acceleration
    }

    /// Gravitational acceleration on the massive body `index` from every
    /// other body, read from the covered trajectories.
    pub fn compute_gravitational_acceleration_on_body(
        &self,
        index: usize,
        t: Instant,
    ) -> AccelerationVector<F> {
        let position = self.trajectories[index].evaluate_position(t);
        let mut acceleration = AccelerationVector::<F>::zero();
        for (j, (body, trajectory)) in self.bodies.iter().zip(&self.trajectories).enumerate() {
            if j == index {
                continue;
            }
            let r = position - trajectory.evaluate_position(t);
            acceleration += point_mass_acceleration(body.gravitational_parameter(), &r);
            if let Some(oblateness) = body.oblateness() {
                acceleration +=
                    degree_two_zonal_acceleration(oblateness, body.gravitational_parameter(), &r);
            }
        }
        acceleration
    }

    /// Creates a fixed-step instance seeded from the last sample of
    /// `trajectory`.
    pub fn new_instance(
        &self,
        trajectory: &DiscreteTrajectory<F>,
        node: ForkId,
        parameters: FixedStepParameters,
    ) -> FixedStepInstance<F> {
        let (t, dof) = trajectory
            .back(node)
            .expect("cannot create an instance for an empty trajectory");
        FixedStepInstance {
            parameters,
            state: SystemState::new(t, &[dof]),
        }
    }

    /// Advances `instance` with its fixed step as far as possible without
    /// passing `t`, appending every step to `trajectory`. The ephemeris
    /// must already cover `t`.
    pub fn flow_with_fixed_step(
        &self,
        t: Instant,
        instance: &mut FixedStepInstance<F>,
        trajectory: &mut DiscreteTrajectory<F>,
        node: ForkId,
    ) {
        assert!(
            t <= self.t_max(),
            "fixed-step flow to {t} beyond the covered {}",
            self.t_max()
        );
        let step = instance.parameters.step;
        while instance.state.time() + step <= t {
            step_symplectic(
                instance.parameters.integrator,
                &mut instance.state,
                step,
                |tau, positions, accelerations| {
                    accelerations[0] = self.compute_gravitational_acceleration(&positions[0], tau);
                },
            );
            trajectory.append(node, instance.state.time(), instance.state.degrees_of_freedom(0));
        }
    }

    /// Integrates the massless follower whose last state is the back of
    /// `trajectory` up to `t_final` against the frozen ephemeris, adding
    /// `intrinsic_acceleration`, and appends every accepted step. The
    /// ephemeris must already cover `t_final`.
    pub fn flow_with_adaptive_step(
        &self,
        trajectory: &mut DiscreteTrajectory<F>,
        node: ForkId,
        intrinsic_acceleration: impl Fn(Instant) -> AccelerationVector<F>,
        t_final: Instant,
        parameters: &AdaptiveStepParameters,
    ) -> FlowOutcome {
        assert!(
            t_final <= self.t_max(),
            "adaptive flow to {t_final} beyond the covered {}",
            self.t_max()
        );
        let (t, dof) = trajectory
            .back(node)
            .expect("cannot flow an empty trajectory");
        flow_embedded_rkn(
            parameters,
            t,
            dof,
            t_final,
            |tau, q| self.compute_gravitational_acceleration(q, tau) + intrinsic_acceleration(tau),
            |tau, dof| trajectory.append(node, tau, dof),
        )
    }

    fn coverage(&self) -> Option<Instant> {
        self.trajectories
            .iter()
            .map(|trajectory| trajectory.t_max())
            .min()
            .flatten()
    }

    /// One fixed step of the whole system, appended to every trajectory.
    fn step_once(&mut self) {
        let bodies = &self.bodies;
        step_symplectic(
            self.parameters.integrator,
            &mut self.state,
            self.parameters.step,
            |t, positions, accelerations| {
                Self::massive_accelerations(bodies, t, positions, accelerations);
            },
        );
        for (i, trajectory) in self.trajectories.iter_mut().enumerate() {
            trajectory.append(self.state.time(), self.state.degrees_of_freedom(i));
        }
    }

    /// Mutual accelerations of the massive bodies, with the degree-2 zonal
    /// terms of oblate bodies and their reactions.
    fn massive_accelerations(
        bodies: &[MassiveBody<F>],
        _t: Instant,
        positions: &[Position<F>],
        accelerations: &mut [AccelerationVector<F>],
    ) {
        for a in accelerations.iter_mut() {
            *a = AccelerationVector::zero();
        }
        for i in 0..bodies.len() {
            for j in (i + 1)..bodies.len() {
                let mu_i = bodies[i].gravitational_parameter();
                let mu_j = bodies[j].gravitational_parameter();
                let r_ij = positions[i] - positions[j];
                accelerations[i] += point_mass_acceleration(mu_j, &r_ij);
                accelerations[j] += point_mass_acceleration(mu_i, &-r_ij);
                if let Some(oblateness) = bodies[j].oblateness() {
                    let correction = degree_two_zonal_acceleration(oblateness, mu_j, &r_ij);
                    accelerations[i] += correction;
                    accelerations[j] -= correction * (mu_i / mu_j);
                }
                if let Some(oblateness) = bodies[i].oblateness() {
                    let correction = degree_two_zonal_acceleration(oblateness, mu_i, &-r_ij);
                    accelerations[j] += correction;
                    accelerations[i] -= correction * (mu_j / mu_i);
                }
            }
        }
    }
}
