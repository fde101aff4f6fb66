use crate::error::{Result, ShapeError};
use crate::math::polygon_2d::{centroid_2d, perimeter_2d};
use crate::math::{is_finite, Point2, Vector2};

use super::Segment;

/// Relative gap tolerated between consecutive segments of a chain.
const CHAIN_TOLERANCE: f64 = 1e-9;

/// A continuous chain of segments, open or closed.
///
/// A closed contour has an implicit straight edge from its last end point
/// back to `start`, the same way path data treats `Z`.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub start: Point2,
    pub segments: Vec<Segment>,
    pub closed: bool,
    /// Layer / glyph identifier used for named pairing and layered export.
    pub key: Option<String>,
}

impl Contour {
    /// Creates an empty open contour at `start`.
    #[must_use]
    pub fn new(start: Point2) -> Self {
        Self {
            start,
            segments: Vec::new(),
            closed: false,
            key: None,
        }
    }

    /// Creates a contour of straight lines through `points`.
    ///
    /// An empty slice yields a contour at the origin with no segments.
    #[must_use]
    pub fn from_points(points: &[Point2], closed: bool) -> Self {
        let start = points.first().copied().unwrap_or_else(Point2::origin);
        let segments = points
            .windows(2)
            .map(|w| Segment::line(w[0], w[1]))
            .collect();
        Self {
            start,
            segments,
            closed,
            key: None,
        }
    }

    /// Creates a closed, zero-size contour sitting at `at`.
    #[must_use]
    pub fn point(at: Point2) -> Self {
        Self {
            start: at,
            segments: vec![Segment::line(at, at)],
            closed: true,
            key: None,
        }
    }

    /// Sets the contour key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Appends a line to `to`.
    #[must_use]
    pub fn line_to(mut self, to: Point2) -> Self {
        let from = self.end();
        self.segments.push(Segment::Line { from, to });
        self
    }

    /// Appends a quadratic Bézier.
    #[must_use]
    pub fn quad_to(mut self, ctrl: Point2, to: Point2) -> Self {
        let from = self.end();
        self.segments.push(Segment::Quadratic { from, ctrl, to });
        self
    }

    /// Appends a cubic Bézier.
    #[must_use]
    pub fn cubic_to(mut self, ctrl1: Point2, ctrl2: Point2, to: Point2) -> Self {
        let from = self.end();
        self.segments.push(Segment::Cubic {
            from,
            ctrl1,
            ctrl2,
            to,
        });
        self
    }

    /// Appends an elliptical arc in end-point form.
    #[must_use]
    pub fn arc_to(
        mut self,
        radii: Vector2,
        x_rotation: f64,
        large_arc: bool,
        sweep: bool,
        to: Point2,
    ) -> Self {
        let from = self.end();
        self.segments.push(Segment::Arc {
            from,
            to,
            radii,
            x_rotation,
            large_arc,
            sweep,
        });
        self
    }

    /// Marks the contour closed.
    #[must_use]
    pub fn close(mut self) -> Self {
        self.closed = true;
        self
    }

    /// Returns the end point of the last segment, or `start` when empty.
    #[must_use]
    pub fn end(&self) -> Point2 {
        self.segments.last().map_or(self.start, Segment::end)
    }

    /// The implicit closing edge of a closed contour, if it has any length.
    #[must_use]
    pub fn closing_segment(&self) -> Option<Segment> {
        let end = self.end();
        (self.closed && end != self.start).then(|| Segment::line(end, self.start))
    }

    /// Segments including the materialized closing edge.
    #[must_use]
    pub fn closed_chain(&self) -> Vec<Segment> {
        let mut chain = self.segments.clone();
        chain.extend(self.closing_segment());
        chain
    }

    /// Checks that all coordinates are finite and the chain is continuous.
    ///
    /// `index` is the contour's position in its shape, used for reporting.
    ///
    /// # Errors
    ///
    /// Returns `ShapeError::NonFinite` or `ShapeError::Discontinuous`.
    pub fn validate(&self, index: usize) -> Result<()> {
        if !is_finite(&self.start) {
            return Err(ShapeError::NonFinite {
                contour: index,
                segment: 0,
            }
            .into());
        }
        let mut prev = self.start;
        for (i, seg) in self.segments.iter().enumerate() {
            if !seg.is_finite() {
                return Err(ShapeError::NonFinite {
                    contour: index,
                    segment: i,
                }
                .into());
            }
            let gap = (seg.start() - prev).norm();
            let scale = 1.0 + prev.x.abs().max(prev.y.abs());
            if gap > CHAIN_TOLERANCE * scale {
                return Err(ShapeError::Discontinuous {
                    contour: index,
                    segment: i,
                    gap,
                }
                .into());
            }
            prev = seg.end();
        }
        Ok(())
    }

    /// Cheap polyline approximation (start included, closing edge implied).
    #[must_use]
    pub fn coarse_points(&self) -> Vec<Point2> {
        let mut points = vec![self.start];
        for seg in &self.segments {
            seg.coarse_points(&mut points);
        }
        points
    }

    /// Approximate centroid: area centroid of a coarse flattening, vertex
    /// mean when that encloses no area.
    #[must_use]
    pub fn centroid(&self) -> Point2 {
        centroid_2d(&self.coarse_points()).unwrap_or(self.start)
    }

    /// Approximate perimeter (closing edge included when closed).
    #[must_use]
    pub fn approx_length(&self) -> f64 {
        perimeter_2d(&self.coarse_points(), self.closed)
    }

    /// Axis-aligned bounds of the coarse flattening as `(min, max)`.
    #[must_use]
    pub fn bounds(&self) -> (Point2, Point2) {
        self.coarse_points().iter().fold(
            (self.start, self.start),
            |(lo, hi), p| {
                (
                    Point2::new(lo.x.min(p.x), lo.y.min(p.y)),
                    Point2::new(hi.x.max(p.x), hi.y.max(p.y)),
                )
            },
        )
    }

    /// Cuts the contour in two at chain parameter `u`.
    ///
    /// `u` runs from 0 to the number of segments of [`Self::closed_chain`];
    /// its integer part picks the segment and its fraction the position
    /// inside it. Both pieces inherit the key. Pieces of a closed contour
    /// are closed by their chord; pieces of an open contour stay open.
    #[must_use]
    pub fn split_at(&self, u: f64) -> (Self, Self) {
        let chain = if self.closed {
            self.closed_chain()
        } else {
            self.segments.clone()
        };
        if chain.is_empty() {
            return (self.clone(), self.clone());
        }

        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let (index, frac) = {
            let u = u.clamp(0.0, chain.len() as f64);
            let index = (u.floor() as usize).min(chain.len() - 1);
            (index, u - index as f64)
        };

        let mut first: Vec<Segment> = chain[..index].to_vec();
        let mut second: Vec<Segment> = Vec::with_capacity(chain.len() - index + 1);
        if frac <= 0.0 {
            second.extend_from_slice(&chain[index..]);
        } else if frac >= 1.0 {
            first.push(chain[index]);
            second.extend_from_slice(&chain[index + 1..]);
        } else {
            let (left, right) = chain[index].split(frac);
            first.push(left);
            second.push(right);
            second.extend_from_slice(&chain[index + 1..]);
        }

        let cut = first.last().map_or(self.start, Segment::end);
        let piece = |start: Point2, segments: Vec<Segment>| Self {
            start,
            // A piece with nothing left still has to exist as a point.
            segments: if segments.is_empty() {
                vec![Segment::line(start, start)]
            } else {
                segments
            },
            closed: self.closed,
            key: self.key.clone(),
        };
        (piece(self.start, first), piece(cut, second))
    }

    /// Joins two contours into one chain, bridging the gap with straight
    /// connectors. A closed input keeps its closing edge in the chain; the
    /// result is closed only when both inputs are.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        let own_chain = |c: &Self| {
            if c.closed {
                c.closed_chain()
            } else {
                c.segments.clone()
            }
        };
        let mut segments = own_chain(self);
        let joint = segments.last().map_or(self.start, Segment::end);
        if joint != other.start {
            segments.push(Segment::line(joint, other.start));
        }
        segments.extend(own_chain(other));
        Self {
            start: self.start,
            segments,
            closed: self.closed && other.closed,
            key: self.key.clone().or_else(|| other.key.clone()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::MorphError;
    use approx::assert_abs_diff_eq;

    fn square() -> Contour {
        Contour::new(Point2::new(0.0, 0.0))
            .line_to(Point2::new(2.0, 0.0))
            .line_to(Point2::new(2.0, 2.0))
            .line_to(Point2::new(0.0, 2.0))
            .close()
    }

    #[test]
    fn builder_chains_segments() {
        let c = square();
        assert_eq!(c.segments.len(), 3);
        assert_eq!(c.end(), Point2::new(0.0, 2.0));
        assert_eq!(
            c.closing_segment(),
            Some(Segment::line(Point2::new(0.0, 2.0), Point2::new(0.0, 0.0)))
        );
        assert!(c.validate(0).is_ok());
    }

    #[test]
    fn curve_builders_continue_from_the_end() {
        let c = Contour::new(Point2::new(0.0, 0.0))
            .quad_to(Point2::new(1.0, 1.0), Point2::new(2.0, 0.0))
            .cubic_to(
                Point2::new(3.0, 0.0),
                Point2::new(3.0, 2.0),
                Point2::new(2.0, 2.0),
            );
        assert_eq!(c.segments.len(), 2);
        assert_eq!(c.segments[1].start(), Point2::new(2.0, 0.0));
        assert_eq!(c.end(), Point2::new(2.0, 2.0));
        assert!(c.validate(0).is_ok());
    }

    #[test]
    fn closing_segment_absent_when_already_closed() {
        let c = square().line_to(Point2::new(0.0, 0.0));
        assert!(c.closing_segment().is_none());
    }

    #[test]
    fn validate_rejects_nan() {
        let c = Contour::new(Point2::new(0.0, 0.0)).line_to(Point2::new(f64::NAN, 1.0));
        assert!(matches!(
            c.validate(3),
            Err(MorphError::MalformedShape(ShapeError::NonFinite {
                contour: 3,
                segment: 0
            }))
        ));
    }

    #[test]
    fn validate_rejects_gaps() {
        let mut c = square();
        c.segments[1] = Segment::line(Point2::new(5.0, 5.0), Point2::new(2.0, 2.0));
        assert!(matches!(
            c.validate(0),
            Err(MorphError::MalformedShape(ShapeError::Discontinuous { segment: 1, .. }))
        ));
    }

    #[test]
    fn centroid_and_length() {
        let c = square();
        let centroid = c.centroid();
        assert_abs_diff_eq!(centroid.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(centroid.y, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.approx_length(), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn split_closed_square_in_half() {
        let (a, b) = square().split_at(2.0);
        assert_eq!(a.start, Point2::new(0.0, 0.0));
        assert_eq!(a.end(), Point2::new(2.0, 2.0));
        assert_eq!(b.start, Point2::new(2.0, 2.0));
        assert_eq!(b.end(), Point2::new(0.0, 0.0));
        assert!(a.closed && b.closed);
        assert_eq!(a.segments.len() + b.segments.len(), 4);
    }

    #[test]
    fn split_inside_segment() {
        let open = Contour::new(Point2::new(0.0, 0.0)).line_to(Point2::new(4.0, 0.0));
        let (a, b) = open.split_at(0.25);
        assert_eq!(a.end(), Point2::new(1.0, 0.0));
        assert_eq!(b.start, Point2::new(1.0, 0.0));
        assert!(!a.closed);
    }

    #[test]
    fn merge_bridges_closed_contours() {
        let other = Contour::from_points(
            &[
                Point2::new(5.0, 0.0),
                Point2::new(6.0, 0.0),
                Point2::new(6.0, 1.0),
            ],
            true,
        );
        let merged = square().merged(&other);
        assert!(merged.closed);
        assert!(merged.validate(0).is_ok());
        // 4 square edges + bridge + 3 triangle edges.
        assert_eq!(merged.segments.len(), 8);
        assert_eq!(merged.end(), Point2::new(5.0, 0.0));
    }

    #[test]
    fn merge_with_open_contour_keeps_closing_edge() {
        let open = Contour::new(Point2::new(5.0, 0.0)).line_to(Point2::new(8.0, 0.0));
        let merged = square().merged(&open);
        assert!(!merged.closed);
        assert!(merged.validate(0).is_ok());
        // 3 square edges + its closing edge + bridge + 1 line.
        assert_eq!(merged.segments.len(), 6);
        assert_eq!(
            merged.segments[3],
            Segment::line(Point2::new(0.0, 2.0), Point2::new(0.0, 0.0))
        );
        assert_eq!(merged.end(), Point2::new(8.0, 0.0));

        // Open first, closed second: the square still comes back to its start.
        let merged = open.merged(&square());
        assert_eq!(merged.segments.len(), 6);
        assert_eq!(merged.end(), Point2::new(0.0, 0.0));
    }
}
