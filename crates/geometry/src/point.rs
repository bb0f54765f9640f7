//! Affine positions, degrees of freedom, and barycentres.

use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

use crate::frame::Frame;
use crate::grassmann::{Displacement, Velocity};
use nbody_quantities::{Length, Mass, Quantity};

/// An affine point of space in frame `F`.
///
/// Positions cannot be added together; they differ by a [`Displacement`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Position<F: Frame> {
    from_origin: Displacement<F>,
}

impl<F: Frame> Position<F> {
    /// The origin of frame `F`.
    #[inline]
    pub fn origin() -> Self {
        Self {
            from_origin: Displacement::zero(),
        }
    }

    #[inline]
    pub fn new(x: Length, y: Length, z: Length) -> Self {
        Self {
            from_origin: Displacement::new(x, y, z),
        }
    }

    #[inline]
    pub fn displacement_from_origin(&self) -> Displacement<F> {
        self.from_origin
    }
}

impl<F: Frame> Sub for Position<F> {
    type Output = Displacement<F>;
    #[inline]
    fn sub(self, rhs: Self) -> Displacement<F> {
        self.from_origin - rhs.from_origin
    }
}

impl<F: Frame> Add<Displacement<F>> for Position<F> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Displacement<F>) -> Self {
        Self {
            from_origin: self.from_origin + rhs,
        }
    }
}

impl<F: Frame> Sub<Displacement<F>> for Position<F> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Displacement<F>) -> Self {
        Self {
            from_origin: self.from_origin - rhs,
        }
    }
}

impl<F: Frame> AddAssign<Displacement<F>> for Position<F> {
    #[inline]
    fn add_assign(&mut self, rhs: Displacement<F>) {
        self.from_origin += rhs;
    }
}

/// A (position, velocity) pair in frame `F`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct DegreesOfFreedom<F: Frame> {
    pub position: Position<F>,
    pub velocity: Velocity<F>,
}

impl<F: Frame> DegreesOfFreedom<F> {
    #[inline]
    pub fn new(position: Position<F>, velocity: Velocity<F>) -> Self {
        Self { position, velocity }
    }

    /// The origin of `F`, at rest.
    #[inline]
    pub fn origin_at_rest() -> Self {
        Self::new(Position::origin(), Velocity::zero())
    }
}

/// Mass-weighted average of degrees of freedom.
#[derive(Debug, Clone)]
pub struct BarycentreCalculator<F: Frame> {
    weighted_position: [f64; 3],
    weighted_velocity: [f64; 3],
    total_weight: Mass,
    phantom: PhantomData<F>,
}

impl<F: Frame> BarycentreCalculator<F> {
    pub fn new() -> Self {
        Self {
            weighted_position: [0.0; 3],
            weighted_velocity: [0.0; 3],
            total_weight: Mass::ZERO,
            phantom: PhantomData,
        }
    }

    pub fn add(&mut self, dof: &DegreesOfFreedom<F>, weight: Mass) {
        let p = dof.position.displacement_from_origin().coords();
        let v = dof.velocity.coords();
        for i in 0..3 {
            self.weighted_position[i] += p[i] * weight.si();
            self.weighted_velocity[i] += v[i] * weight.si();
        }
        self.total_weight += weight;
    }

    /// The barycentre accumulated so far; at least one body must have been
    /// added.
    pub fn get(&self) -> DegreesOfFreedom<F> {
        assert!(
            self.total_weight > Mass::ZERO,
            "empty barycentre calculator"
        );
        let w = self.total_weight.si();
        DegreesOfFreedom::new(
            Position::origin()
                + Displacement::new(
                    Length::from_si(self.weighted_position[0] / w),
                    Length::from_si(self.weighted_position[1] / w),
                    Length::from_si(self.weighted_position[2] / w),
                ),
            Velocity::new(
                nbody_quantities::Speed::from_si(self.weighted_velocity[0] / w),
                nbody_quantities::Speed::from_si(self.weighted_velocity[1] / w),
                nbody_quantities::Speed::from_si(self.weighted_velocity[2] / w),
            ),
        )
    }
}

impl<F: Frame> Default for BarycentreCalculator<F> {
    fn default() -> Self {
        Self::new()
    }
}
