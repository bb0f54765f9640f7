//! Adaptive-step embedded Runge–Kutta–Nyström integration of
//! `q̈ = a(q, t)` for a single body.

use serde::{Deserialize, Serialize};

use crate::symplectic;
use nbody_geometry::{AccelerationVector, DegreesOfFreedom, Displacement, Frame, Position};
use nbody_quantities::{Instant, Length, Speed, Time};

// Dormand, El-Mikkawy & Prince (1986), RKN4(3)4FM. The last stage is
// evaluated at the accepted solution, so it seeds the first stage of the
// next step (FSAL).
const C: [f64; 4] = [0.0, 1.0 / 4.0, 7.0 / 10.0, 1.0];
const A: [[f64; 3]; 3] = [
    [1.0 / 32.0, 0.0, 0.0],
    [7.0 / 1000.0, 119.0 / 500.0, 0.0],
    [1.0 / 14.0, 8.0 / 27.0, 25.0 / 189.0],
];
const B_HAT: [f64; 4] = [1.0 / 14.0, 8.0 / 27.0, 25.0 / 189.0, 0.0];
const B_PRIME_HAT: [f64; 4] = [1.0 / 14.0, 32.0 / 81.0, 250.0 / 567.0, 5.0 / 54.0];
const B: [f64; 4] = [-7.0 / 150.0, 67.0 / 150.0, 3.0 / 20.0, -1.0 / 20.0];
const B_PRIME: [f64; 4] = [13.0 / 21.0, -20.0 / 27.0, 275.0 / 189.0, -1.0 / 3.0];

const SAFETY_FACTOR: f64 = 0.9;
const MIN_STEP_MULTIPLIER: f64 = 0.25;
const MAX_STEP_MULTIPLIER: f64 = 4.0;

/// No bound on the accepted-step budget.
pub const UNLIMITED_MAX_STEPS: u64 = u64::MAX;

/// Identifier of an embedded adaptive method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdaptiveStepIntegrator {
    DormandElMikkawyPrince1986Rkn434Fm,
}

/// Method, budget and per-step tolerances for adaptive integration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveStepParameters {
    pub integrator: AdaptiveStepIntegrator,
    pub max_steps: u64,
    pub length_integration_tolerance: Length,
    pub speed_integration_tolerance: Speed,
}

impl AdaptiveStepParameters {
    pub fn new(
        integrator: AdaptiveStepIntegrator,
        max_steps: u64,
        length_integration_tolerance: Length,
        speed_integration_tolerance: Speed,
    ) -> Self {
        assert!(max_steps > 0, "the step budget must be positive");
        assert!(
            length_integration_tolerance > Length::ZERO
                && speed_integration_tolerance > Speed::ZERO,
            "integration tolerances must be positive"
        );
        Self {
            integrator,
            max_steps,
            length_integration_tolerance,
            speed_integration_tolerance,
        }
    }
}

/// How an adaptive flow ended. Truncation is a value, not an error: the
/// integrated prefix is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowOutcome {
    /// The final time was reached exactly.
    ReachedFinalTime,
    /// The accepted-step budget ran out first.
    StepBudgetExhausted,
    /// The step size shrank below the spacing of representable instants.
    StepUnderflow,
}

impl FlowOutcome {
    pub fn reached_final_time(self) -> bool {
        self == Self::ReachedFinalTime
    }
}

/// The integration state of a single body.
pub type OdeState<F> = symplectic::SystemState<F>;

fn single_body_state<F: Frame>(time: Instant, dof: DegreesOfFreedom<F>) -> OdeState<F> {
    OdeState::new(time, &[dof])
}

/// Integrates `q̈ = a(q, t)` adaptively from `(time, dof)` towards
/// `t_final`, calling `append` after every accepted step, and returns how
/// the flow ended together with the final state.
pub fn flow_embedded_rkn<F: Frame>(
    parameters: &AdaptiveStepParameters,
    time: Instant,
    dof: DegreesOfFreedom<F>,
    t_final: Instant,
    mut acceleration: impl FnMut(Instant, &Position<F>) -> AccelerationVector<F>,
    mut append: impl FnMut(Instant, DegreesOfFreedom<F>),
) -> FlowOutcome {
    let AdaptiveStepIntegrator::DormandElMikkawyPrince1986Rkn434Fm = parameters.integrator;
    if t_final <= time {
        return FlowOutcome::ReachedFinalTime;
    }

    let mut state = single_body_state(time, dof);
    let mut h: Time = t_final - time;
    let mut g_first = acceleration(time, &state.positions[0].value());
    let mut accepted: u64 = 0;

    loop {
        let t = state.time.value();
        let remaining = t_final - t;
        let at_end = h >= remaining;
        if at_end {
            h = remaining;
        }
        if !(t + h > t) {
            return FlowOutcome::StepUnderflow;
        }

        let q = state.positions[0].value();
        let v = state.velocities[0];
        let h2 = h * h;

        let mut g = [g_first; 4];
        for i in 1..4 {
            let mut correction = Displacement::<F>::zero();
            for (j, gj) in g.iter().enumerate().take(i) {
                correction += *gj * (h2 * A[i - 1][j]);
            }
            let q_stage = q + v * (h * C[i]) + correction;
            g[i] = acceleration(t + h * C[i], &q_stage);
        }

        let mut weighted = AccelerationVector::<F>::zero();
        let mut weighted_prime = AccelerationVector::<F>::zero();
        let mut error_weighted = AccelerationVector::<F>::zero();
        let mut error_weighted_prime = AccelerationVector::<F>::zero();
        for i in 0..4 {
            weighted += g[i] * B_HAT[i];
            weighted_prime += g[i] * B_PRIME_HAT[i];
            error_weighted += g[i] * (B_HAT[i] - B[i]);
            error_weighted_prime += g[i] * (B_PRIME_HAT[i] - B_PRIME[i]);
        }
        let dq = v * h + weighted * h2;
        let v_hat = v + weighted_prime * h;
        let position_error = (error_weighted * h2).norm();
        let speed_error = (error_weighted_prime * h).norm();

        let ratio = tolerance_to_error_ratio(
            parameters.length_integration_tolerance,
            position_error,
            parameters.speed_integration_tolerance,
            speed_error,
        );

        if ratio >= 1.0 {
            state.positions[0].increment(dq);
            state.velocities[0] = v_hat;
            if at_end {
                state.time.set(t_final);
            } else {
                state.time.increment(h);
            }
            g_first = g[3];
            accepted += 1;
            append(state.time.value(), state.degrees_of_freedom(0));
            if at_end {
                return FlowOutcome::ReachedFinalTime;
            }
            if accepted >= parameters.max_steps {
                return FlowOutcome::StepBudgetExhausted;
            }
        }

        let multiplier =
            (SAFETY_FACTOR * ratio.powf(0.25)).clamp(MIN_STEP_MULTIPLIER, MAX_STEP_MULTIPLIER);
        h = h * multiplier;
    }
}

fn tolerance_to_error_ratio(
    length_tolerance: Length,
    position_error: Length,
    speed_tolerance: Speed,
    speed_error: Speed,
) -> f64 {
    let position_ratio = if position_error > Length::ZERO {
        length_tolerance / position_error
    } else {
        f64::INFINITY
    };
    let speed_ratio = if speed_error > Speed::ZERO {
        speed_tolerance / speed_error
    } else {
        f64::INFINITY
    };
    position_ratio.min(speed_ratio)
}
