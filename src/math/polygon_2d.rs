use super::{Point2, TOLERANCE};

/// Computes the signed area of a closed point ring (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise (y up).
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Area centroid of a closed point ring.
///
/// Falls back to the vertex mean when the ring encloses no area (lines,
/// coincident points). Returns `None` for an empty slice.
#[must_use]
pub fn centroid_2d(points: &[Point2]) -> Option<Point2> {
    if points.is_empty() {
        return None;
    }
    let n = points.len();
    let mut area2 = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let p = &points[i];
        let q = &points[(i + 1) % n];
        let cross = p.x * q.y - q.x * p.y;
        area2 += cross;
        cx += (p.x + q.x) * cross;
        cy += (p.y + q.y) * cross;
    }
    if area2.abs() > TOLERANCE {
        return Some(Point2::new(cx / (3.0 * area2), cy / (3.0 * area2)));
    }
    #[allow(clippy::cast_precision_loss)]
    let inv = 1.0 / n as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point2::new(sx * inv, sy * inv))
}

/// Total edge length, including the wrap-around edge when `closed`.
#[must_use]
pub fn perimeter_2d(points: &[Point2], closed: bool) -> f64 {
    let open: f64 = points.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
    match (closed, points.first(), points.last()) {
        (true, Some(first), Some(last)) if points.len() > 1 => open + (first - last).norm(),
        _ => open,
    }
}

/// Returns the minimum distance from `p` to the segment `a`–`b`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let d = b - a;
    let len_sq = d.norm_squared();

    if len_sq < 1e-20 {
        // Degenerate segment (zero length).
        return (p - a).norm();
    }

    // Project onto the infinite line, clamp to [0, 1].
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    (p - (a + d * t)).norm()
}

/// Returns the ring rotated left by `k`, so that `points[k]` comes first.
#[must_use]
pub fn rotated(points: &[Point2], k: usize) -> Vec<Point2> {
    if points.is_empty() {
        return Vec::new();
    }
    let k = k % points.len();
    let mut out = Vec::with_capacity(points.len());
    out.extend_from_slice(&points[k..]);
    out.extend_from_slice(&points[..k]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn unit_square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn signed_area_ccw_square() {
        assert_abs_diff_eq!(signed_area_2d(&unit_square()), 1.0, epsilon = TOLERANCE);
    }

    #[test]
    fn signed_area_cw_square() {
        let mut pts = unit_square();
        pts.reverse();
        assert_abs_diff_eq!(signed_area_2d(&pts), -1.0, epsilon = TOLERANCE);
    }

    #[test]
    fn signed_area_degenerate() {
        assert_abs_diff_eq!(signed_area_2d(&[Point2::new(0.0, 0.0)]), 0.0);
        assert_abs_diff_eq!(signed_area_2d(&[]), 0.0);
    }

    #[test]
    fn centroid_of_triangle() {
        let tri = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ];
        let c = centroid_2d(&tri).unwrap_or_else(Point2::origin);
        assert_abs_diff_eq!(c.x, 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.y, 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn centroid_of_segment_falls_back_to_mean() {
        let seg = [Point2::new(0.0, 0.0), Point2::new(4.0, 2.0)];
        let c = centroid_2d(&seg).unwrap_or_else(Point2::origin);
        assert_abs_diff_eq!(c.x, 2.0);
        assert_abs_diff_eq!(c.y, 1.0);
        assert!(centroid_2d(&[]).is_none());
    }

    #[test]
    fn perimeter_open_and_closed() {
        assert_abs_diff_eq!(perimeter_2d(&unit_square(), false), 3.0);
        assert_abs_diff_eq!(perimeter_2d(&unit_square(), true), 4.0);
    }

    #[test]
    fn segment_distance() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(2.0, 0.0);
        assert_abs_diff_eq!(point_to_segment_dist(&Point2::new(1.0, 1.0), &a, &b), 1.0);
        assert_abs_diff_eq!(point_to_segment_dist(&Point2::new(3.0, 0.0), &a, &b), 1.0);
        assert_abs_diff_eq!(point_to_segment_dist(&Point2::new(0.0, 2.0), &a, &a), 2.0);
    }

    #[test]
    fn rotation() {
        let r = rotated(&unit_square(), 1);
        assert_eq!(r[0], Point2::new(1.0, 0.0));
        assert_eq!(r[3], Point2::new(0.0, 0.0));
        assert_eq!(rotated(&unit_square(), 4), unit_square());
    }
}
