//! Points in time.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::Time;
use crate::Quantity;

/// An instant on the simulation timeline, stored as seconds past J2000.
///
/// Instants are affine: two instants differ by a [`Time`], and only a
/// [`Time`] can be added to an instant. The ordering is total (via
/// `f64::total_cmp`), so instants can key ordered containers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instant(f64);

impl Instant {
    /// The epoch: 2000-01-01T12:00:00 TT.
    pub const J2000: Self = Self(0.0);

    #[inline]
    pub fn from_j2000(offset: Time) -> Self {
        Self(offset.si())
    }

    /// Offset from the J2000 epoch.
    #[inline]
    pub fn since_j2000(self) -> Time {
        Time::from_si(self.0)
    }
}

impl PartialEq for Instant {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Instant {}

impl PartialOrd for Instant {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Instant {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add<Time> for Instant {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Time) -> Self {
        Self(self.0 + rhs.si())
    }
}

impl Sub<Time> for Instant {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Time) -> Self {
        Self(self.0 - rhs.si())
    }
}

impl Sub for Instant {
    type Output = Time;
    #[inline]
    fn sub(self, rhs: Self) -> Time {
        Time::from_si(self.0 - rhs.0)
    }
}

impl AddAssign<Time> for Instant {
    #[inline]
    fn add_assign(&mut self, rhs: Time) {
        self.0 += rhs.si();
    }
}

impl SubAssign<Time> for Instant {
    #[inline]
    fn sub_assign(&mut self, rhs: Time) {
        self.0 -= rhs.si();
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "J2000 + {} s", self.0)
    }
}
