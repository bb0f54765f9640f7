//! Inertia tensors.

use std::marker::PhantomData;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::frame::Frame;
use crate::grassmann::{AngularMomentumBivector, AngularVelocity, Displacement};
use crate::rotation::Rotation;
use nbody_quantities::{AngularFrequency, AngularMomentum, Mass, MomentOfInertia, Quantity};

/// The symmetric mass-distribution tensor of a rigid body about its centre
/// of mass, expressed in frame `F`. Entries are in kg·m².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct InertiaTensor<F: Frame> {
    matrix: [[f64; 3]; 3],
    #[serde(skip)]
    phantom: PhantomData<F>,
}

impl<F: Frame> InertiaTensor<F> {
    pub fn from_diagonal(
        xx: MomentOfInertia,
        yy: MomentOfInertia,
        zz: MomentOfInertia,
    ) -> Self {
        Self::from_matrix([
            [xx.si(), 0.0, 0.0],
            [0.0, yy.si(), 0.0],
            [0.0, 0.0, zz.si()],
        ])
    }

    /// The parallel-axis contribution of a point mass at `displacement`
    /// from the reference point: `m (‖d‖² δ − d ⊗ d)`.
    pub fn point_mass(mass: Mass, displacement: &Displacement<F>) -> Self {
        let d = displacement.coords();
        let d2 = d[0] * d[0] + d[1] * d[1] + d[2] * d[2];
        let m = mass.si();
        let mut matrix = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                matrix[i][j] = m * (if i == j { d2 } else { 0.0 } - d[i] * d[j]);
            }
        }
        Self::from_matrix(matrix)
    }

    pub fn zero() -> Self {
        Self::from_matrix([[0.0; 3]; 3])
    }

    /// This tensor expressed in frame `To`, i.e. `R I Rᵀ`.
    pub fn rotate<To: Frame>(&self, rotation: &Rotation<F, To>) -> InertiaTensor<To> {
        let r = rotation.matrix();
        let i = &self.matrix;
        let mut ir = [[0.0; 3]; 3]; // I Rᵀ
        for a in 0..3 {
            for b in 0..3 {
                ir[a][b] = (0..3).map(|k| i[a][k] * r[b][k]).sum();
            }
        }
        let mut rir = [[0.0; 3]; 3]; // R (I Rᵀ)
        for a in 0..3 {
            for b in 0..3 {
                rir[a][b] = (0..3).map(|k| r[a][k] * ir[k][b]).sum();
            }
        }
        InertiaTensor::from_matrix(rir)
    }

    /// The angular momentum of a rigid body with this inertia rotating at
    /// `ω`.
    pub fn apply(&self, omega: &AngularVelocity<F>) -> AngularMomentumBivector<F> {
        let w = [omega.x().si(), omega.y().si(), omega.z().si()];
        let i = &self.matrix;
        AngularMomentumBivector::new(
            AngularMomentum::from_si(i[0][0] * w[0] + i[0][1] * w[1] + i[0][2] * w[2]),
            AngularMomentum::from_si(i[1][0] * w[0] + i[1][1] * w[1] + i[1][2] * w[2]),
            AngularMomentum::from_si(i[2][0] * w[0] + i[2][1] * w[1] + i[2][2] * w[2]),
        )
    }

    /// The angular velocity of a rigid body with this inertia and angular
    /// momentum `l`. The tensor must be invertible.
    pub fn solve(&self, l: &AngularMomentumBivector<F>) -> AngularVelocity<F> {
        let m = &self.matrix;
        let cofactor = |a: usize, b: usize| {
            let (r0, r1) = match a {
                0 => (1, 2),
                1 => (0, 2),
                _ => (0, 1),
            };
            let (c0, c1) = match b {
                0 => (1, 2),
                1 => (0, 2),
                _ => (0, 1),
            };
            let minor = m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0];
            if (a + b) % 2 == 0 { minor } else { -minor }
        };
        let det =
            m[0][0] * cofactor(0, 0) + m[0][1] * cofactor(0, 1) + m[0][2] * cofactor(0, 2);
        assert!(det != 0.0, "singular inertia tensor");
        let b = [l.x().si(), l.y().si(), l.z().si()];
        let component = |i: usize| {
            // Adjugate is the transposed cofactor matrix.
            AngularFrequency::from_si(
                (cofactor(0, i) * b[0] + cofactor(1, i) * b[1] + cofactor(2, i) * b[2]) / det,
            )
        };
        AngularVelocity::new(component(0), component(1), component(2))
    }

    pub(crate) fn from_matrix(matrix: [[f64; 3]; 3]) -> Self {
        Self {
            matrix,
            phantom: PhantomData,
        }
    }

    pub(crate) fn matrix(&self) -> [[f64; 3]; 3] {
        self.matrix
    }
}

impl<F: Frame> Add for InertiaTensor<F> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let mut matrix = self.matrix;
        for i in 0..3 {
            for j in 0..3 {
                matrix[i][j] += rhs.matrix[i][j];
            }
        }
        Self::from_matrix(matrix)
    }
}

impl<F: Frame> AddAssign for InertiaTensor<F> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
