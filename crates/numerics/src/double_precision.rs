//! Compensated (Kahan) accumulation.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A value of type `T` accumulated together with a running compensation of
/// its difference type `D`, limiting drift when many small increments are
/// summed (integrator times and positions).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoublePrecision<T, D> {
    value: T,
    error: D,
}

impl<T, D> DoublePrecision<T, D>
where
    T: Copy + Add<D, Output = T> + Sub<T, Output = D>,
    D: Copy + Default + Sub<Output = D>,
{
    pub fn new(value: T) -> Self {
        Self {
            value,
            error: D::default(),
        }
    }

    #[inline]
    pub fn value(&self) -> T {
        self.value
    }

    /// Adds `delta`, folding the rounding error into the compensation.
    pub fn increment(&mut self, delta: D) {
        let y = delta - self.error;
        let t = self.value + y;
        self.error = (t - self.value) - y;
        self.value = t;
    }

    /// Overwrites the value and clears the compensation.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.error = D::default();
    }
}
