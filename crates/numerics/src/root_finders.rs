//! Bisection and the stable quadratic solver.

use std::ops::{Add, Mul, Sub};

use nbody_quantities::{Quantity, dimensions_quotient};

/// Approximates a root of `f` between `lower_bound` and `upper_bound` by
/// bisection. The result is within one ULP of a sign change of any
/// continuous function agreeing with `f` on the representable arguments.
///
/// `f(lower_bound)` and `f(upper_bound)` must be nonzero and of opposite
/// signs.
pub fn bisect<A, D, V>(f: impl Fn(A) -> V, lower_bound: A, upper_bound: A) -> A
where
    A: Copy + PartialOrd + Sub<A, Output = D> + Add<D, Output = A>,
    D: Copy + Mul<f64, Output = D>,
    V: Copy + Default + PartialOrd,
{
    let zero = V::default();
    let mut lower = lower_bound;
    let mut upper = upper_bound;
    assert!(lower < upper, "bisection interval is empty");
    let mut f_lower = f(lower);
    let f_upper = f(upper);
    assert!(
        f_lower != zero && f_upper != zero,
        "bisection endpoints must be nonzero"
    );
    assert!(
        (f_lower < zero) != (f_upper < zero),
        "bisection endpoints must have opposite signs"
    );
    loop {
        let midpoint = lower + (upper - lower) * 0.5;
        if !(lower < midpoint && midpoint < upper) {
            // No representable argument strictly inside; the sign change
            // is bracketed to one ULP.
            return lower;
        }
        let f_midpoint = f(midpoint);
        if f_midpoint == zero {
            return midpoint;
        }
        if (f_midpoint < zero) == (f_lower < zero) {
            lower = midpoint;
            f_lower = f_midpoint;
        } else {
            upper = midpoint;
        }
    }
}

/// Returns the real solutions of
/// `a2 (x − origin)² + a1 (x − origin) + a0 == 0`, in increasing order
/// (zero, one or two of them).
///
/// The larger-magnitude root is computed with the conjugate trick so that a
/// dominant `a1` does not cancel.
pub fn solve_quadratic_equation<A, V, V1, V2>(origin: A, a0: V, a1: V1, a2: V2) -> Vec<A>
where
    A: Quantity,
    V: Quantity,
    V1: Quantity,
    V2: Quantity,
{
    debug_assert_eq!(
        V1::DIMENSIONS,
        dimensions_quotient(V::DIMENSIONS, A::DIMENSIONS),
        "a1 must have the dimensions of a0 over the argument"
    );
    debug_assert_eq!(
        V2::DIMENSIONS,
        dimensions_quotient(V1::DIMENSIONS, A::DIMENSIONS),
        "a2 must have the dimensions of a1 over the argument"
    );

    let (a0, a1, a2) = (a0.si(), a1.si(), a2.si());
    let mut roots = Vec::with_capacity(2);
    if a2 == 0.0 {
        if a1 != 0.0 {
            roots.push(A::from_si(origin.si() - a0 / a1));
        }
        return roots;
    }
    let discriminant = a1 * a1 - 4.0 * a0 * a2;
    if discriminant < 0.0 {
        return roots;
    }
    if discriminant == 0.0 {
        roots.push(A::from_si(origin.si() - a1 / (2.0 * a2)));
        return roots;
    }
    let q = -0.5 * (a1 + a1.signum() * discriminant.sqrt());
    let y1 = q / a2;
    let y2 = a0 / q;
    let (low, high) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
    roots.push(A::from_si(origin.si() + low));
    roots.push(A::from_si(origin.si() + high));
    roots
}
