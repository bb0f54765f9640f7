//! Numerical building blocks: compensated summation, Chebyshev series,
//! root finders, and the fixed- and adaptive-step Runge–Kutta–Nyström
//! integrators used by the ephemeris.

mod chebyshev;
mod double_precision;
mod embedded;
mod root_finders;
mod symplectic;

pub use chebyshev::{ChebyshevSeries, MAX_DEGREE, MIN_DEGREE};
pub use double_precision::DoublePrecision;
pub use embedded::{
    AdaptiveStepIntegrator, AdaptiveStepParameters, FlowOutcome, OdeState, UNLIMITED_MAX_STEPS,
    flow_embedded_rkn,
};
pub use root_finders::{bisect, solve_quadratic_equation};
pub use symplectic::{FixedStepIntegrator, FixedStepParameters, SystemState, step_symplectic};
