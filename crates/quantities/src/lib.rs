//! Dimensional quantities for the N-body core.
//!
//! Every scalar that crosses a module boundary carries its dimension as a
//! distinct Rust type, so that `Length / Time` is a `Speed` and adding a
//! `Speed` to a `Mass` is a compile error. Each type records its dimension
//! vector — the eight integer exponents of length, mass, time, current,
//! temperature, amount, luminous intensity, and winding — where the winding
//! pseudo-dimension counts cycles and keeps `Hz` distinct from `rad/s`.
//! Magnitudes are stored in SI base units; construction goes through the
//! factories in [`si`].

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

mod instant;
pub mod si;

pub use instant::Instant;

/// Exponents of length, mass, time, current, temperature, amount, luminous
/// intensity, and winding, in that order.
pub type DimensionVector = [i8; 8];

/// A scalar magnitude tagged with a dimension vector.
///
/// The magnitude is in SI base units (plus cycles for the winding
/// dimension). `si`/`from_si` exist for numerical kernels and
/// serialization; ordinary code combines quantities through their
/// operators instead.
pub trait Quantity: Copy + PartialEq + PartialOrd {
    const DIMENSIONS: DimensionVector;

    fn si(self) -> f64;
    fn from_si(magnitude: f64) -> Self;
}

/// The dimensionless scalar: all exponents zero.
impl Quantity for f64 {
    const DIMENSIONS: DimensionVector = [0; 8];

    #[inline]
    fn si(self) -> f64 {
        self
    }

    #[inline]
    fn from_si(magnitude: f64) -> Self {
        magnitude
    }
}

/// Component-wise sum of two dimension vectors.
pub const fn dimensions_product(left: DimensionVector, right: DimensionVector) -> DimensionVector {
    let mut result = [0; 8];
    let mut i = 0;
    while i < 8 {
        result[i] = left[i] + right[i];
        i += 1;
    }
    result
}

/// Component-wise difference of two dimension vectors.
pub const fn dimensions_quotient(left: DimensionVector, right: DimensionVector) -> DimensionVector {
    let mut result = [0; 8];
    let mut i = 0;
    while i < 8 {
        result[i] = left[i] - right[i];
        i += 1;
    }
    result
}

macro_rules! quantity {
    ($(#[$attr:meta])* $name:ident, $symbol:literal,
     [$l:literal, $m:literal, $t:literal, $i:literal, $th:literal, $n:literal, $j:literal, $w:literal]) => {
        $(#[$attr])*
        #[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(f64);

        impl $name {
            pub const ZERO: Self = Self(0.0);

            #[inline]
            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }

            #[inline]
            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0))
            }

            #[inline]
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl Quantity for $name {
            const DIMENSIONS: DimensionVector = [$l, $m, $t, $i, $th, $n, $j, $w];

            #[inline]
            fn si(self) -> f64 {
                self.0
            }

            #[inline]
            fn from_si(magnitude: f64) -> Self {
                Self(magnitude)
            }
        }

        impl Add for $name {
            type Output = Self;
            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = Self;
            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $name {
            type Output = Self;
            #[inline]
            fn neg(self) -> Self {
                Self(-self.0)
            }
        }

        impl AddAssign for $name {
            #[inline]
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl SubAssign for $name {
            #[inline]
            fn sub_assign(&mut self, rhs: Self) {
                self.0 -= rhs.0;
            }
        }

        impl Mul<f64> for $name {
            type Output = Self;
            #[inline]
            fn mul(self, rhs: f64) -> Self {
                Self(self.0 * rhs)
            }
        }

        impl Mul<$name> for f64 {
            type Output = $name;
            #[inline]
            fn mul(self, rhs: $name) -> $name {
                $name(self * rhs.0)
            }
        }

        impl Div<f64> for $name {
            type Output = Self;
            #[inline]
            fn div(self, rhs: f64) -> Self {
                Self(self.0 / rhs)
            }
        }

        impl MulAssign<f64> for $name {
            #[inline]
            fn mul_assign(&mut self, rhs: f64) {
                self.0 *= rhs;
            }
        }

        impl DivAssign<f64> for $name {
            #[inline]
            fn div_assign(&mut self, rhs: f64) {
                self.0 /= rhs;
            }
        }

        /// The ratio of two like quantities is dimensionless.
        impl Div for $name {
            type Output = f64;
            #[inline]
            fn div(self, rhs: Self) -> f64 {
                self.0 / rhs.0
            }
        }

        impl Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|q| q.0).sum())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} {}", self.0, $symbol)
            }
        }
    };
}

/// Declares `$product = $left * $right` for two distinct quantities,
/// generating both multiplication orders and both quotients.
macro_rules! relation {
    ($product:ident = $left:ident * $right:ident) => {
        impl Mul<$right> for $left {
            type Output = $product;
            #[inline]
            fn mul(self, rhs: $right) -> $product {
                $product::from_si(self.si() * rhs.si())
            }
        }

        impl Mul<$left> for $right {
            type Output = $product;
            #[inline]
            fn mul(self, rhs: $left) -> $product {
                $product::from_si(self.si() * rhs.si())
            }
        }

        impl Div<$right> for $product {
            type Output = $left;
            #[inline]
            fn div(self, rhs: $right) -> $left {
                $left::from_si(self.si() / rhs.si())
            }
        }

        impl Div<$left> for $product {
            type Output = $right;
            #[inline]
            fn div(self, rhs: $left) -> $right {
                $right::from_si(self.si() / rhs.si())
            }
        }
    };
}

/// Declares `$square = $base²`, with the square root going back down.
macro_rules! square_relation {
    ($square:ident = $base:ident ^ 2) => {
        impl Mul for $base {
            type Output = $square;
            #[inline]
            fn mul(self, rhs: Self) -> $square {
                $square::from_si(self.si() * rhs.si())
            }
        }

        impl Div<$base> for $square {
            type Output = $base;
            #[inline]
            fn div(self, rhs: $base) -> $base {
                $base::from_si(self.si() / rhs.si())
            }
        }

        impl $square {
            #[inline]
            pub fn sqrt(self) -> $base {
                $base::from_si(self.si().sqrt())
            }
        }
    };
}

quantity!(
    /// Duration, in seconds.
    Time, "s", [0, 0, 1, 0, 0, 0, 0, 0]);
quantity!(
    /// The square of a duration, in s².
    SquaredTime, "s^2", [0, 0, 2, 0, 0, 0, 0, 0]);
quantity!(
    /// Length, in metres.
    Length, "m", [1, 0, 0, 0, 0, 0, 0, 0]);
quantity!(
    /// Mass, in kilograms.
    Mass, "kg", [0, 1, 0, 0, 0, 0, 0, 0]);
quantity!(
    /// Area, in m².
    Area, "m^2", [2, 0, 0, 0, 0, 0, 0, 0]);
quantity!(
    /// Volume, in m³.
    Volume, "m^3", [3, 0, 0, 0, 0, 0, 0, 0]);
quantity!(
    /// Speed, in m/s.
    Speed, "m/s", [1, 0, -1, 0, 0, 0, 0, 0]);
quantity!(
    /// Acceleration, in m/s².
    Acceleration, "m/s^2", [1, 0, -2, 0, 0, 0, 0, 0]);
quantity!(
    /// Momentum, in kg·m/s.
    Momentum, "kg m/s", [1, 1, -1, 0, 0, 0, 0, 0]);
quantity!(
    /// Force, in newtons.
    Force, "N", [1, 1, -2, 0, 0, 0, 0, 0]);
quantity!(
    /// Torque, in N·m.
    Torque, "N m", [2, 1, -2, 0, 0, 0, 0, 0]);
quantity!(
    /// Angular momentum, in kg·m²/s.
    AngularMomentum, "kg m^2/s", [2, 1, -1, 0, 0, 0, 0, 0]);
quantity!(
    /// Moment of inertia, in kg·m².
    MomentOfInertia, "kg m^2", [2, 1, 0, 0, 0, 0, 0, 0]);
quantity!(
    /// Plane angle, in radians. Radians are taken as the dimensionless
    /// unit angle; cycles live in [`Winding`] instead.
    Angle, "rad", [0, 0, 0, 0, 0, 0, 0, 0]);
quantity!(
    /// Winding count, in cycles. Distinguishes Hz from rad/s.
    Winding, "cycle", [0, 0, 0, 0, 0, 0, 0, 1]);
quantity!(
    /// Angular frequency, in rad/s.
    AngularFrequency, "rad/s", [0, 0, -1, 0, 0, 0, 0, 0]);
quantity!(
    /// Frequency, in Hz (cycles per second).
    Frequency, "Hz", [0, 0, -1, 0, 0, 0, 0, 1]);
quantity!(
    /// Inverse square time, in s⁻²; the quotient of a gravitational
    /// parameter by a volume.
    InverseSquareTime, "s^-2", [0, 0, -2, 0, 0, 0, 0, 0]);
quantity!(
    /// Standard gravitational parameter GM, in m³/s².
    GravitationalParameter, "m^3/s^2", [3, 0, -2, 0, 0, 0, 0, 0]);
quantity!(
    /// Mass change rate, in kg/s.
    MassRate, "kg/s", [0, 1, -1, 0, 0, 0, 0, 0]);

relation!(Length = Speed * Time);
relation!(Speed = Acceleration * Time);
relation!(Length = Acceleration * SquaredTime);
relation!(Volume = Area * Length);
relation!(GravitationalParameter = Acceleration * Area);
relation!(GravitationalParameter = InverseSquareTime * Volume);
relation!(Acceleration = Length * InverseSquareTime);
relation!(Force = Mass * Acceleration);
relation!(Force = Speed * MassRate);
relation!(Torque = Force * Length);
relation!(AngularMomentum = Torque * Time);
relation!(Momentum = Mass * Speed);
relation!(AngularMomentum = Length * Momentum);
relation!(MomentOfInertia = Mass * Area);
relation!(AngularMomentum = MomentOfInertia * AngularFrequency);
relation!(Speed = AngularFrequency * Length);
relation!(Mass = MassRate * Time);
relation!(Angle = AngularFrequency * Time);
relation!(Winding = Frequency * Time);

square_relation!(Area = Length ^ 2);
square_relation!(SquaredTime = Time ^ 2);
square_relation!(InverseSquareTime = AngularFrequency ^ 2);

impl Volume {
    #[inline]
    pub fn cbrt(self) -> Length {
        Length::from_si(self.si().cbrt())
    }
}

impl Angle {
    #[inline]
    pub fn sin(self) -> f64 {
        self.0.sin()
    }

    #[inline]
    pub fn cos(self) -> f64 {
        self.0.cos()
    }

    #[inline]
    pub fn tan(self) -> f64 {
        self.0.tan()
    }
}

#[cfg(test)]
mod proptest_quantities;
