use crate::math::arc_2d::{arc_from_endpoints, ArcParams};
use crate::math::bezier_2d::{cubic_point, quad_point, split_cubic, split_quad};
use crate::math::{is_finite, lerp, Point2, Vector2};

/// One geometric piece of a contour.
///
/// Every variant stores its own start point so that chain continuity can be
/// checked instead of assumed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line {
        from: Point2,
        to: Point2,
    },
    Quadratic {
        from: Point2,
        ctrl: Point2,
        to: Point2,
    },
    Cubic {
        from: Point2,
        ctrl1: Point2,
        ctrl2: Point2,
        to: Point2,
    },
    /// Elliptical arc in end-point form.
    Arc {
        from: Point2,
        to: Point2,
        radii: Vector2,
        /// Rotation of the ellipse's x-axis, in degrees.
        x_rotation: f64,
        large_arc: bool,
        sweep: bool,
    },
}

impl Segment {
    /// Creates a straight line segment.
    #[must_use]
    pub fn line(from: Point2, to: Point2) -> Self {
        Self::Line { from, to }
    }

    /// Returns the start point.
    #[must_use]
    pub fn start(&self) -> Point2 {
        match *self {
            Self::Line { from, .. }
            | Self::Quadratic { from, .. }
            | Self::Cubic { from, .. }
            | Self::Arc { from, .. } => from,
        }
    }

    /// Returns the end point.
    #[must_use]
    pub fn end(&self) -> Point2 {
        match *self {
            Self::Line { to, .. }
            | Self::Quadratic { to, .. }
            | Self::Cubic { to, .. }
            | Self::Arc { to, .. } => to,
        }
    }

    /// Returns `true` for straight lines, including arcs that degenerate to one.
    #[must_use]
    pub fn is_straight(&self) -> bool {
        match self {
            Self::Line { .. } => true,
            Self::Arc { .. } => self.arc_params().is_none(),
            _ => false,
        }
    }

    /// Returns `true` when every coordinate of the segment is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Line { from, to } => is_finite(from) && is_finite(to),
            Self::Quadratic { from, ctrl, to } => {
                is_finite(from) && is_finite(ctrl) && is_finite(to)
            }
            Self::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => is_finite(from) && is_finite(ctrl1) && is_finite(ctrl2) && is_finite(to),
            Self::Arc {
                from,
                to,
                radii,
                x_rotation,
                ..
            } => {
                is_finite(from)
                    && is_finite(to)
                    && radii.x.is_finite()
                    && radii.y.is_finite()
                    && x_rotation.is_finite()
            }
        }
    }

    /// Center form of an arc segment; `None` for other segments or for arcs
    /// that degenerate to a line.
    #[must_use]
    pub fn arc_params(&self) -> Option<ArcParams> {
        match *self {
            Self::Arc {
                from,
                to,
                radii,
                x_rotation,
                large_arc,
                sweep,
            } => arc_from_endpoints(from, to, radii.x, radii.y, x_rotation, large_arc, sweep),
            _ => None,
        }
    }

    /// Evaluates the segment at parameter `t` in `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        match *self {
            Self::Line { from, to } => lerp(&from, &to, t),
            Self::Quadratic { from, ctrl, to } => quad_point(&[from, ctrl, to], t),
            Self::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => cubic_point(&[from, ctrl1, ctrl2, to], t),
            Self::Arc { from, to, .. } => match self.arc_params() {
                Some(arc) => arc.point_at(t),
                None => lerp(&from, &to, t),
            },
        }
    }

    /// Splits the segment at parameter `t` into two segments of the same kind.
    ///
    /// The returned halves share the split point exactly.
    #[must_use]
    pub fn split(&self, t: f64) -> (Self, Self) {
        match *self {
            Self::Line { from, to } => {
                let m = lerp(&from, &to, t);
                (Self::line(from, m), Self::line(m, to))
            }
            Self::Quadratic { from, ctrl, to } => {
                let (l, r) = split_quad(&[from, ctrl, to], t);
                (
                    Self::Quadratic {
                        from: l[0],
                        ctrl: l[1],
                        to: l[2],
                    },
                    Self::Quadratic {
                        from: r[0],
                        ctrl: r[1],
                        to: r[2],
                    },
                )
            }
            Self::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => {
                let (l, r) = split_cubic(&[from, ctrl1, ctrl2, to], t);
                (
                    Self::Cubic {
                        from: l[0],
                        ctrl1: l[1],
                        ctrl2: l[2],
                        to: l[3],
                    },
                    Self::Cubic {
                        from: r[0],
                        ctrl1: r[1],
                        ctrl2: r[2],
                        to: r[3],
                    },
                )
            }
            Self::Arc {
                from,
                to,
                x_rotation,
                sweep,
                ..
            } => {
                let Some(arc) = self.arc_params() else {
                    let m = lerp(&from, &to, t);
                    return (Self::line(from, m), Self::line(m, to));
                };
                let m = arc.point_at(t);
                // Radii are taken from the center form, which already holds
                // any out-of-range correction.
                let radii = Vector2::new(arc.rx, arc.ry);
                let half = |sweep_angle: f64, from: Point2, to: Point2| Self::Arc {
                    from,
                    to,
                    radii,
                    x_rotation,
                    large_arc: sweep_angle.abs() > std::f64::consts::PI,
                    sweep,
                };
                (
                    half(arc.sweep * t, from, m),
                    half(arc.sweep * (1.0 - t), m, to),
                )
            }
        }
    }

    /// A handful of points on the segment (excluding the start), used for
    /// cheap estimates such as centroids and perimeters.
    pub(crate) fn coarse_points(&self, out: &mut Vec<Point2>) {
        const SAMPLES: u32 = 8;
        if self.is_straight() {
            out.push(self.end());
            return;
        }
        for i in 1..SAMPLES {
            out.push(self.point_at(f64::from(i) / f64::from(SAMPLES)));
        }
        out.push(self.end());
    }
}
