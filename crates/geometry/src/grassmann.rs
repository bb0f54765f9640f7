//! Typed vectors and bivectors over raw SI coordinates.

use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::frame::Frame;
use nbody_quantities::{Acceleration, AngularFrequency, AngularMomentum, Force, Length, Quantity, Speed, Torque};

macro_rules! multivector {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
        #[serde(bound = "")]
        pub struct $name<Q, F> {
            coords: [f64; 3],
            #[serde(skip)]
            phantom: PhantomData<(Q, F)>,
        }

        impl<Q: Quantity, F: Frame> $name<Q, F> {
            #[inline]
            pub fn new(x: Q, y: Q, z: Q) -> Self {
                Self::from_coords([x.si(), y.si(), z.si()])
            }

            #[inline]
            pub fn zero() -> Self {
                Self::from_coords([0.0; 3])
            }

            #[inline]
            pub fn x(&self) -> Q {
                Q::from_si(self.coords[0])
            }

            #[inline]
            pub fn y(&self) -> Q {
                Q::from_si(self.coords[1])
            }

            #[inline]
            pub fn z(&self) -> Q {
                Q::from_si(self.coords[2])
            }

            #[inline]
            pub fn norm(&self) -> Q {
                let [x, y, z] = self.coords;
                Q::from_si((x * x + y * y + z * z).sqrt())
            }

            #[inline]
            pub(crate) fn from_coords(coords: [f64; 3]) -> Self {
                Self {
                    coords,
                    phantom: PhantomData,
                }
            }

            #[inline]
            pub(crate) fn coords(&self) -> [f64; 3] {
                self.coords
            }
        }

        impl<Q: Quantity, F: Frame> Default for $name<Q, F> {
            fn default() -> Self {
                Self::zero()
            }
        }

        impl<Q: Quantity, F: Frame> Add for $name<Q, F> {
            type Output = Self;
            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self::from_coords([
                    self.coords[0] + rhs.coords[0],
                    self.coords[1] + rhs.coords[1],
                    self.coords[2] + rhs.coords[2],
                ])
            }
        }

        impl<Q: Quantity, F: Frame> Sub for $name<Q, F> {
            type Output = Self;
            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self::from_coords([
                    self.coords[0] - rhs.coords[0],
                    self.coords[1] - rhs.coords[1],
                    self.coords[2] - rhs.coords[2],
                ])
            }
        }

        impl<Q: Quantity, F: Frame> Neg for $name<Q, F> {
            type Output = Self;
            #[inline]
            fn neg(self) -> Self {
                Self::from_coords([-self.coords[0], -self.coords[1], -self.coords[2]])
            }
        }

        impl<Q: Quantity, F: Frame> AddAssign for $name<Q, F> {
            #[inline]
            fn add_assign(&mut self, rhs: Self) {
                *self = *self + rhs;
            }
        }

        impl<Q: Quantity, F: Frame> SubAssign for $name<Q, F> {
            #[inline]
            fn sub_assign(&mut self, rhs: Self) {
                *self = *self - rhs;
            }
        }

        /// Multiplication by a scalar quantity (including plain `f64`)
        /// rescales the coordinates and multiplies the dimensions.
        impl<Q, S, F> Mul<S> for $name<Q, F>
        where
            Q: Quantity + Mul<S>,
            S: Quantity,
            <Q as Mul<S>>::Output: Quantity,
            F: Frame,
        {
            type Output = $name<<Q as Mul<S>>::Output, F>;

            #[inline]
            fn mul(self, rhs: S) -> Self::Output {
                $name::from_coords([
                    self.coords[0] * rhs.si(),
                    self.coords[1] * rhs.si(),
                    self.coords[2] * rhs.si(),
                ])
            }
        }

        impl<Q, S, F> Div<S> for $name<Q, F>
        where
            Q: Quantity + Div<S>,
            S: Quantity,
            <Q as Div<S>>::Output: Quantity,
            F: Frame,
        {
            type Output = $name<<Q as Div<S>>::Output, F>;

            #[inline]
            fn div(self, rhs: S) -> Self::Output {
                $name::from_coords([
                    self.coords[0] / rhs.si(),
                    self.coords[1] / rhs.si(),
                    self.coords[2] / rhs.si(),
                ])
            }
        }

        impl<Q: Quantity, F: Frame> Mul<$name<Q, F>> for f64 {
            type Output = $name<Q, F>;

            #[inline]
            fn mul(self, rhs: $name<Q, F>) -> $name<Q, F> {
                $name::from_coords([
                    self * rhs.coords[0],
                    self * rhs.coords[1],
                    self * rhs.coords[2],
                ])
            }
        }
    };
}

multivector!(
    /// A frame-tagged polar vector with components of quantity `Q`.
    Vector
);
multivector!(
    /// A frame-tagged bivector (oriented plane element), stored in axial
    /// coordinates; used for angular velocities, torques and angular
    /// momenta.
    Bivector
);

/// Inner product; the result carries the product dimension.
#[inline]
pub fn dot<QL, QR, F>(left: &Vector<QL, F>, right: &Vector<QR, F>) -> <QL as Mul<QR>>::Output
where
    QL: Quantity + Mul<QR>,
    QR: Quantity,
    <QL as Mul<QR>>::Output: Quantity,
    F: Frame,
{
    let l = left.coords();
    let r = right.coords();
    <QL as Mul<QR>>::Output::from_si(l[0] * r[0] + l[1] * r[1] + l[2] * r[2])
}

/// Exterior product of two vectors, as a bivector.
#[inline]
pub fn wedge<QL, QR, F>(left: &Vector<QL, F>, right: &Vector<QR, F>) -> Bivector<<QL as Mul<QR>>::Output, F>
where
    QL: Quantity + Mul<QR>,
    QR: Quantity,
    <QL as Mul<QR>>::Output: Quantity,
    F: Frame,
{
    let l = left.coords();
    let r = right.coords();
    Bivector::from_coords([
        l[1] * r[2] - l[2] * r[1],
        l[2] * r[0] - l[0] * r[2],
        l[0] * r[1] - l[1] * r[0],
    ])
}

impl<Q: Quantity, F: Frame> Bivector<Q, F> {
    /// Action of this bivector on a vector (the cross product in axial
    /// coordinates); an angular velocity acting on a displacement yields
    /// the rotational velocity.
    #[inline]
    pub fn cross<S>(&self, v: &Vector<S, F>) -> Vector<<Q as Mul<S>>::Output, F>
    where
        Q: Mul<S>,
        S: Quantity,
        <Q as Mul<S>>::Output: Quantity,
    {
        let b = self.coords();
        let r = v.coords();
        Vector::from_coords([
            b[1] * r[2] - b[2] * r[1],
            b[2] * r[0] - b[0] * r[2],
            b[0] * r[1] - b[1] * r[0],
        ])
    }
}

/// Displacement from a position or between positions, in metres.
pub type Displacement<F> = Vector<Length, F>;
/// Velocity of a point, in m/s.
pub type Velocity<F> = Vector<Speed, F>;
/// Acceleration of a point, in m/s².
pub type AccelerationVector<F> = Vector<Acceleration, F>;
/// A force, in newtons.
pub type ForceVector<F> = Vector<Force, F>;
/// Angular velocity of a frame, in rad/s.
pub type AngularVelocity<F> = Bivector<AngularFrequency, F>;
/// Angular momentum about a point, in kg·m²/s.
pub type AngularMomentumBivector<F> = Bivector<AngularMomentum, F>;
/// A torque, in N·m.
pub type TorqueBivector<F> = Bivector<Torque, F>;
