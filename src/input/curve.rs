//! Analog stick response curve

/// Stick deflection below this reads as zero
pub const DEAD_ZONE: f32 = 0.2;
/// Stick deflection above this reads as full
pub const SATURATION: f32 = 0.9;

/// Map a non-negative deflection into `[0, 1]` with a dead zone
#[inline]
pub fn axis_curve(v: f32) -> f32 {
    ((v - DEAD_ZONE) / (SATURATION - DEAD_ZONE)).clamp(0.0, 1.0)
}

/// Symmetric variant of [`axis_curve`] for signed axes
#[inline]
pub fn signed_curve(v: f32) -> f32 {
    if v == 0.0 {
        0.0
    } else {
        v.signum() * axis_curve(v.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_curve_edges() {
        assert_eq!(axis_curve(0.0), 0.0);
        assert_eq!(axis_curve(DEAD_ZONE), 0.0);
        assert_eq!(axis_curve(SATURATION), 1.0);
        assert_eq!(axis_curve(1.0), 1.0);
        assert!((axis_curve(0.55) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_signed_curve_is_odd() {
        assert_eq!(signed_curve(0.0), 0.0);
        assert_eq!(signed_curve(-1.0), -1.0);
        assert!((signed_curve(-0.55) + 0.5).abs() < 1e-6);
        assert_eq!(signed_curve(-0.1), 0.0);
    }

    proptest! {
        #[test]
        fn prop_curve_bounded(v in -2.0f32..2.0) {
            let c = axis_curve(v);
            prop_assert!((0.0..=1.0).contains(&c));
            prop_assert!(signed_curve(v).abs() <= 1.0);
        }

        #[test]
        fn prop_curve_monotonic(a in 0.0f32..1.0, b in 0.0f32..1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(axis_curve(lo) <= axis_curve(hi));
        }
    }
}
