pub mod arc_2d;
pub mod bezier_2d;
pub mod polygon_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Returns `true` when both coordinates of `p` are finite.
#[must_use]
pub fn is_finite(p: &Point2) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

/// Linear interpolation written so that `t = 0` yields `a` and `t = 1`
/// yields `b` bit-for-bit.
#[must_use]
pub fn lerp(a: &Point2, b: &Point2, t: f64) -> Point2 {
    let s = 1.0 - t;
    Point2::new(s * a.x + t * b.x, s * a.y + t * b.y)
}

/// Midpoint of two points.
#[must_use]
pub fn midpoint(a: &Point2, b: &Point2) -> Point2 {
    Point2::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_is_exact_at_endpoints() {
        let a = Point2::new(0.1, 0.7);
        let b = Point2::new(3.3, -2.9);
        assert_eq!(lerp(&a, &b, 0.0), a);
        assert_eq!(lerp(&a, &b, 1.0), b);
    }

    #[test]
    fn finite_check() {
        assert!(is_finite(&Point2::new(1.0, 2.0)));
        assert!(!is_finite(&Point2::new(f64::NAN, 2.0)));
        assert!(!is_finite(&Point2::new(1.0, f64::INFINITY)));
    }
}
