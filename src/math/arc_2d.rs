/// 2D elliptical-arc math utilities.
///
/// Path data describes arcs by their end points (`rx ry x-rotation
/// large-arc sweep`). Everything downstream works on the center form
/// produced by [`arc_from_endpoints`].
use std::f64::consts::{PI, TAU};

use super::{Point2, TOLERANCE};

/// Center-parameterized elliptical arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcParams {
    pub center: Point2,
    pub rx: f64,
    pub ry: f64,
    /// Rotation of the ellipse's x-axis, in radians.
    pub phi: f64,
    pub start_angle: f64,
    /// Signed sweep in radians; positive follows the sweep-flag=1 direction.
    pub sweep: f64,
}

impl ArcParams {
    /// Evaluates the arc at parameter `t` in `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        let angle = self.start_angle + self.sweep * t;
        let (sin_a, cos_a) = angle.sin_cos();
        let (sin_p, cos_p) = self.phi.sin_cos();
        Point2::new(
            self.center.x + self.rx * cos_a * cos_p - self.ry * sin_a * sin_p,
            self.center.y + self.rx * cos_a * sin_p + self.ry * sin_a * cos_p,
        )
    }

    /// Returns the sub-arc covering parameters `[t0, t1]`.
    #[must_use]
    pub fn sub_arc(&self, t0: f64, t1: f64) -> Self {
        Self {
            start_angle: self.start_angle + self.sweep * t0,
            sweep: self.sweep * (t1 - t0),
            ..*self
        }
    }

    /// Upper bound of the distance between the arc and its chord.
    ///
    /// Uses the sagitta of the circumscribing circle: `r * (1 - cos(θ/2))`.
    #[must_use]
    pub fn sagitta_bound(&self) -> f64 {
        let r = self.rx.max(self.ry);
        let half = (self.sweep.abs() * 0.5).min(PI);
        r * (1.0 - half.cos())
    }

    /// Upper bound of the arc length.
    #[must_use]
    pub fn length_bound(&self) -> f64 {
        self.rx.max(self.ry) * self.sweep.abs()
    }

    /// Returns `true` when the arc lies on a circle.
    #[must_use]
    pub fn is_circular(&self) -> bool {
        (self.rx - self.ry).abs() <= TOLERANCE * self.rx.max(1.0)
    }
}

/// Converts an endpoint-parameterized arc to center form.
///
/// Out-of-range radii are scaled up so that an ellipse through both end
/// points exists. Returns `None` when the arc degenerates: coincident end
/// points (the arc is omitted) or a zero radius (the arc is a straight line).
#[must_use]
pub fn arc_from_endpoints(
    from: Point2,
    to: Point2,
    rx: f64,
    ry: f64,
    x_rotation_deg: f64,
    large_arc: bool,
    sweep_flag: bool,
) -> Option<ArcParams> {
    if (to - from).norm() < TOLERANCE {
        return None;
    }
    let mut rx = rx.abs();
    let mut ry = ry.abs();
    if rx < TOLERANCE || ry < TOLERANCE {
        return None;
    }

    let phi = x_rotation_deg.to_radians();
    let (sin_p, cos_p) = phi.sin_cos();

    // Step 1: move the chord midpoint to the origin and undo the rotation.
    let dx2 = (from.x - to.x) * 0.5;
    let dy2 = (from.y - to.y) * 0.5;
    let x1p = cos_p * dx2 + sin_p * dy2;
    let y1p = -sin_p * dx2 + cos_p * dy2;

    // Step 2: radii correction.
    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }

    // Step 3: center in the rotated frame.
    let rx2 = rx * rx;
    let ry2 = ry * ry;
    let num = rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p;
    let den = rx2 * y1p * y1p + ry2 * x1p * x1p;
    let mut coef = if den > 0.0 { (num / den).max(0.0).sqrt() } else { 0.0 };
    if large_arc == sweep_flag {
        coef = -coef;
    }
    let cxp = coef * rx * y1p / ry;
    let cyp = -coef * ry * x1p / rx;

    // Step 4: back to user space.
    let center = Point2::new(
        cos_p * cxp - sin_p * cyp + (from.x + to.x) * 0.5,
        sin_p * cxp + cos_p * cyp + (from.y + to.y) * 0.5,
    );

    let ux = (x1p - cxp) / rx;
    let uy = (y1p - cyp) / ry;
    let vx = (-x1p - cxp) / rx;
    let vy = (-y1p - cyp) / ry;
    let start_angle = uy.atan2(ux);
    let mut sweep = (ux * vy - uy * vx).atan2(ux * vx + uy * vy);
    if !sweep_flag && sweep > 0.0 {
        sweep -= TAU;
    } else if sweep_flag && sweep < 0.0 {
        sweep += TAU;
    }

    Some(ArcParams {
        center,
        rx,
        ry,
        phi,
        start_angle,
        sweep,
    })
}

/// Bulge of a circular arc with the given sweep: `tan(sweep / 4)`.
///
/// - `0` = straight line
/// - `> 0` = positive-angle arc
/// - `< 0` = negative-angle arc
/// - `|bulge| = 1` = semicircle
#[must_use]
pub fn bulge_from_sweep(sweep: f64) -> f64 {
    (sweep / 4.0).tan()
}
