//! Orientation-preserving orthogonal maps between frames.

use std::marker::PhantomData;
use std::ops::Mul;

use serde::{Deserialize, Serialize};

use crate::frame::Frame;
use crate::grassmann::{Bivector, Vector};
use nbody_quantities::{Angle, Quantity};

/// A rotation taking `From`-frame coordinates to `To`-frame coordinates,
/// represented by a unit quaternion. Acts on vectors and (identically) on
/// bivectors, since it preserves orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Rotation<From: Frame, To: Frame> {
    /// `[w, x, y, z]`.
    quaternion: [f64; 4],
    #[serde(skip)]
    phantom: PhantomData<(From, To)>,
}

impl<From: Frame, To: Frame> Rotation<From, To> {
    pub fn identity() -> Self {
        Self::from_quaternion([1.0, 0.0, 0.0, 0.0])
    }

    /// Rotation by `angle` about the (unit) `axis`.
    pub fn from_axis_angle(angle: Angle, axis: &Vector<f64, From>) -> Self {
        let [x, y, z] = axis.coords();
        let n = (x * x + y * y + z * z).sqrt();
        assert!(n > 0.0, "rotation axis must be nonzero");
        let (s, c) = (angle.si() * 0.5).sin_cos();
        Self::from_quaternion([c, s * x / n, s * y / n, s * z / n])
    }

    pub fn inverse(&self) -> Rotation<To, From> {
        let [w, x, y, z] = self.quaternion;
        Rotation::from_quaternion([w, -x, -y, -z])
    }

    pub fn apply_vector<Q: Quantity>(&self, v: &Vector<Q, From>) -> Vector<Q, To> {
        Vector::from_coords(self.rotate(v.coords()))
    }

    pub fn apply_bivector<Q: Quantity>(&self, b: &Bivector<Q, From>) -> Bivector<Q, To> {
        Bivector::from_coords(self.rotate(b.coords()))
    }

    pub(crate) fn from_quaternion(quaternion: [f64; 4]) -> Self {
        Self {
            quaternion,
            phantom: PhantomData,
        }
    }

    fn rotate(&self, v: [f64; 3]) -> [f64; 3] {
        // v' = v + 2 w (u × v) + 2 u × (u × v), with u the vector part.
        let [w, ux, uy, uz] = self.quaternion;
        let cross = |a: [f64; 3], b: [f64; 3]| {
            [
                a[1] * b[2] - a[2] * b[1],
                a[2] * b[0] - a[0] * b[2],
                a[0] * b[1] - a[1] * b[0],
            ]
        };
        let u = [ux, uy, uz];
        let uv = cross(u, v);
        let uuv = cross(u, uv);
        [
            v[0] + 2.0 * (w * uv[0] + uuv[0]),
            v[1] + 2.0 * (w * uv[1] + uuv[1]),
            v[2] + 2.0 * (w * uv[2] + uuv[2]),
        ]
    }

    /// The 3×3 matrix of this rotation, row-major.
    pub(crate) fn matrix(&self) -> [[f64; 3]; 3] {
        let [w, x, y, z] = self.quaternion;
        [
            [
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y - w * z),
                2.0 * (x * z + w * y),
            ],
            [
                2.0 * (x * y + w * z),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z - w * x),
            ],
            [
                2.0 * (x * z - w * y),
                2.0 * (y * z + w * x),
                1.0 - 2.0 * (x * x + y * y),
            ],
        ]
    }
}

impl<A: Frame, B: Frame, C: Frame> Mul<Rotation<A, B>> for Rotation<B, C> {
    type Output = Rotation<A, C>;

    fn mul(self, rhs: Rotation<A, B>) -> Rotation<A, C> {
        let [lw, lx, ly, lz] = self.quaternion;
        let [rw, rx, ry, rz] = rhs.quaternion;
        Rotation::from_quaternion([
            lw * rw - lx * rx - ly * ry - lz * rz,
            lw * rx + lx * rw + ly * rz - lz * ry,
            lw * ry - lx * rz + ly * rw + lz * rx,
            lw * rz + lx * ry - ly * rx + lz * rw,
        ])
    }
}
