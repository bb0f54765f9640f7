//! Fixed-step symplectic partitioned Runge–Kutta–Nyström integration of
//! `q̈ = a(q, t)` for a whole system of bodies.

use serde::{Deserialize, Serialize};

use crate::double_precision::DoublePrecision;
use nbody_geometry::{AccelerationVector, DegreesOfFreedom, Displacement, Frame, Position, Velocity};
use nbody_quantities::{Instant, Time};

/// McLachlan & Atela (1992), order 5, "optimal" coefficients: six stages
/// of `v += b h a(q); q += a h v`.
const MCLACHLAN_ATELA_1992_ORDER_5_OPTIMAL_A: [f64; 6] = [
    0.339839625839110000,
    -0.088601336903027329,
    0.5858564768259621188,
    -0.603039356536491888,
    0.3235807965546976394,
    0.4423637942197494587,
];
const MCLACHLAN_ATELA_1992_ORDER_5_OPTIMAL_B: [f64; 6] = [
    0.1193900292875672758,
    0.6989273703824752308,
    -0.1713123582716007754,
    0.4012695022513534480,
    0.0107050818482359840,
    -0.0589796254980311632,
];

/// Identifier of a fixed-step symplectic method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixedStepIntegrator {
    McLachlanAtela1992Order5Optimal,
}

impl FixedStepIntegrator {
    fn coefficients(self) -> (&'static [f64], &'static [f64]) {
        match self {
            Self::McLachlanAtela1992Order5Optimal => (
                &MCLACHLAN_ATELA_1992_ORDER_5_OPTIMAL_A,
                &MCLACHLAN_ATELA_1992_ORDER_5_OPTIMAL_B,
            ),
        }
    }
}

/// Method and step size for fixed-step integration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedStepParameters {
    pub integrator: FixedStepIntegrator,
    pub step: Time,
}

impl FixedStepParameters {
    pub fn new(integrator: FixedStepIntegrator, step: Time) -> Self {
        assert!(step > Time::ZERO, "the integration step must be positive");
        Self { integrator, step }
    }
}

/// The in-flight state of a fixed-step integration: compensated time and
/// positions so that `t_n = t_0 + n·h` holds to the accumulated error of a
/// compensated sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct SystemState<F: Frame> {
    pub time: DoublePrecision<Instant, Time>,
    pub positions: Vec<DoublePrecision<Position<F>, Displacement<F>>>,
    pub velocities: Vec<Velocity<F>>,
}

impl<F: Frame> SystemState<F> {
    pub fn new(time: Instant, states: &[DegreesOfFreedom<F>]) -> Self {
        Self {
            time: DoublePrecision::new(time),
            positions: states
                .iter()
                .map(|dof| DoublePrecision::new(dof.position))
                .collect(),
            velocities: states.iter().map(|dof| dof.velocity).collect(),
        }
    }

    pub fn time(&self) -> Instant {
        self.time.value()
    }

    pub fn degrees_of_freedom(&self, index: usize) -> DegreesOfFreedom<F> {
        DegreesOfFreedom::new(self.positions[index].value(), self.velocities[index])
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Advances `state` by exactly one step `h`.
///
/// `acceleration(t, positions, accelerations)` must fill `accelerations`
/// (already sized) with `a(q, t)` for every body.
pub fn step_symplectic<F: Frame>(
    integrator: FixedStepIntegrator,
    state: &mut SystemState<F>,
    h: Time,
    mut acceleration: impl FnMut(Instant, &[Position<F>], &mut [AccelerationVector<F>]),
) {
    let (a, b) = integrator.coefficients();
    let n = state.len();
    let mut positions: Vec<Position<F>> = state.positions.iter().map(|p| p.value()).collect();
    let mut accelerations = vec![AccelerationVector::<F>::zero(); n];

    // Fraction of the step already applied to the positions.
    let mut c = 0.0;
    for stage in 0..a.len() {
        acceleration(state.time.value() + h * c, &positions, &mut accelerations);
        for k in 0..n {
            state.velocities[k] += accelerations[k] * (h * b[stage]);
            state.positions[k].increment(state.velocities[k] * (h * a[stage]));
            positions[k] = state.positions[k].value();
        }
        c += a[stage];
    }
    state.time.increment(h);
}
