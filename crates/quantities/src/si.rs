//! Unit factories and a few astronomical constants.
//!
//! These are the only sanctioned way of making quantities out of bare
//! numbers in ordinary code.

use crate::{
    Acceleration, Angle, AngularFrequency, Force, Frequency, GravitationalParameter, Length, Mass,
    MassRate, MomentOfInertia, Quantity, Speed, Time, Torque, Volume, Winding,
};

/// Metres per astronomical unit (IAU 2012).
pub const ASTRONOMICAL_UNIT_M: f64 = 149_597_870_700.0;
/// Seconds per Julian day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

#[inline]
pub fn metres(x: f64) -> Length {
    Length::from_si(x)
}

#[inline]
pub fn kilometres(x: f64) -> Length {
    metres(x * 1_000.0)
}

#[inline]
pub fn astronomical_units(x: f64) -> Length {
    metres(x * ASTRONOMICAL_UNIT_M)
}

#[inline]
pub fn seconds(x: f64) -> Time {
    Time::from_si(x)
}

#[inline]
pub fn days(x: f64) -> Time {
    seconds(x * SECONDS_PER_DAY)
}

#[inline]
pub fn kilograms(x: f64) -> Mass {
    Mass::from_si(x)
}

#[inline]
pub fn kilograms_per_second(x: f64) -> MassRate {
    MassRate::from_si(x)
}

#[inline]
pub fn metres_per_second(x: f64) -> Speed {
    Speed::from_si(x)
}

#[inline]
pub fn kilometres_per_second(x: f64) -> Speed {
    metres_per_second(x * 1_000.0)
}

#[inline]
pub fn metres_per_second_squared(x: f64) -> Acceleration {
    Acceleration::from_si(x)
}

#[inline]
pub fn newtons(x: f64) -> Force {
    Force::from_si(x)
}

#[inline]
pub fn newton_metres(x: f64) -> Torque {
    Torque::from_si(x)
}

#[inline]
pub fn kilogram_square_metres(x: f64) -> MomentOfInertia {
    MomentOfInertia::from_si(x)
}

#[inline]
pub fn cubic_metres(x: f64) -> Volume {
    Volume::from_si(x)
}

#[inline]
pub fn radians(x: f64) -> Angle {
    Angle::from_si(x)
}

#[inline]
pub fn degrees(x: f64) -> Angle {
    radians(x.to_radians())
}

#[inline]
pub fn radians_per_second(x: f64) -> AngularFrequency {
    AngularFrequency::from_si(x)
}

#[inline]
pub fn cycles(x: f64) -> Winding {
    Winding::from_si(x)
}

#[inline]
pub fn hertz(x: f64) -> Frequency {
    Frequency::from_si(x)
}

#[inline]
pub fn gravitational_parameter(x_m3_s2: f64) -> GravitationalParameter {
    GravitationalParameter::from_si(x_m3_s2)
}
