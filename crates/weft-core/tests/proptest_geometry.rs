//! Property-based invariant tests for geometry primitives.
//!
//! Invariants checked for arbitrary inputs:
//!
//! 1. Intersection is commutative and fits within both inputs.
//! 2. Union is commutative and contains both inputs.
//! 3. Inner margin never grows a rectangle.
//! 4. Right/bottom edges are consistent with x+width, y+height.
//! 5. No panics on extreme u16 values.

use proptest::prelude::*;
use weft_core::geometry::{Rect, Sides};

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (0u16..=500, 0u16..=500, 0u16..=500, 0u16..=500).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn sides_strategy() -> impl Strategy<Value = Sides> {
    (any::<u16>(), any::<u16>(), any::<u16>(), any::<u16>())
        .prop_map(|(t, r, b, l)| Sides::new(t, r, b, l))
}

proptest! {
    #[test]
    fn intersection_commutative(a in rect_strategy(), b in rect_strategy()) {
        prop_assert_eq!(a.intersection(&b), b.intersection(&a));
    }

    #[test]
    fn intersection_fits_both(a in rect_strategy(), b in rect_strategy()) {
        let i = a.intersection(&b);
        if !i.is_empty() {
            prop_assert!(i.x >= a.x && i.right() <= a.right());
            prop_assert!(i.x >= b.x && i.right() <= b.right());
            prop_assert!(i.y >= a.y && i.bottom() <= a.bottom());
            prop_assert!(i.y >= b.y && i.bottom() <= b.bottom());
        }
    }

    #[test]
    fn union_commutative_and_contains(a in rect_strategy(), b in rect_strategy()) {
        let u = a.union(&b);
        prop_assert_eq!(u, b.union(&a));
        prop_assert!(u.x <= a.x && u.right() >= a.right());
        prop_assert!(u.x <= b.x && u.right() >= b.right());
        prop_assert!(u.y <= a.y && u.bottom() >= a.bottom());
        prop_assert!(u.y <= b.y && u.bottom() >= b.bottom());
    }

    #[test]
    fn inner_never_grows(r in rect_strategy(), m in sides_strategy()) {
        let inner = r.inner(m);
        prop_assert!(inner.width <= r.width);
        prop_assert!(inner.height <= r.height);
        prop_assert!(inner.x >= r.x);
        prop_assert!(inner.y >= r.y);
    }

    #[test]
    fn edges_consistent(r in rect_strategy()) {
        prop_assert_eq!(r.right(), r.x + r.width);
        prop_assert_eq!(r.bottom(), r.y + r.height);
    }

    #[test]
    fn no_panics_on_extremes(
        x in any::<u16>(),
        y in any::<u16>(),
        w in any::<u16>(),
        h in any::<u16>(),
        m in sides_strategy(),
    ) {
        let r = Rect::new(x, y, w, h);
        let _ = r.right();
        let _ = r.bottom();
        let _ = r.area();
        let _ = r.inner(m);
        let _ = r.union(&r);
        let _ = r.intersection(&r);
    }
}
