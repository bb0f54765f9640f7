//! Property tests for the quantity algebra.

use proptest::prelude::*;

use crate::si::*;
use crate::Quantity;

fn finite_nonzero() -> impl Strategy<Value = f64> {
    prop::num::f64::NORMAL.prop_filter("nonzero", |x| x.abs() > 1e-100 && x.abs() < 1e100)
}

proptest! {
    #[test]
    fn multiply_then_divide_is_identity_up_to_rounding(a in finite_nonzero(), b in finite_nonzero()) {
        let v = metres_per_second(a);
        let t = seconds(b);
        let roundtrip = (v * t) / t;
        let relative = ((roundtrip.si() - v.si()) / v.si()).abs();
        prop_assert!(relative <= 2.0 * f64::EPSILON, "relative error {relative}");
    }

    #[test]
    fn addition_is_commutative(a in finite_nonzero(), b in finite_nonzero()) {
        let x = metres(a);
        let y = metres(b);
        prop_assert_eq!(x + y, y + x);
    }

    #[test]
    fn addition_associates_within_ulp_tolerance(a in -1e50f64..1e50, b in -1e50f64..1e50, c in -1e50f64..1e50) {
        let (x, y, z) = (metres(a), metres(b), metres(c));
        let left = (x + y) + z;
        let right = x + (y + z);
        let scale = a.abs().max(b.abs()).max(c.abs()).max(f64::MIN_POSITIVE);
        prop_assert!((left.si() - right.si()).abs() <= 4.0 * f64::EPSILON * scale);
    }
}
