//! Trajectory containers: time-indexed sample sequences with cheap forks,
//! and append-only chains of Chebyshev segments for continuous queries.

mod continuous;
mod discrete;

pub use continuous::{ContinuousTrajectory, DIVISIONS};
pub use discrete::{DiscreteTrajectory, ForkId};

#[cfg(test)]
mod proptest_trajectory;
