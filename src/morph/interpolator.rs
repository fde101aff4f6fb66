use std::sync::Arc;

use tracing::debug;

use crate::discretize::{discretize_contour, AccuracySpec};
use crate::error::Result;
use crate::export::path_data::{write_path_data, PathDataOptions};
use crate::geometry::{PathShape, Polygon};
use crate::math::lerp;
use crate::math::polygon_2d::rotated;

use super::align::Align;
use super::equalize::Equalize;
use super::options::MorphOptions;
use super::pairing::{ContourOrigin, ContourPairing, MatchContours};

/// Two equal-length polygons and the offset that lines them up.
///
/// `target[(i + offset) % n]` is where `source[i]` travels to.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedPolygonPair {
    pub source: Polygon,
    pub target: Polygon,
    pub offset: usize,
    pub key: Option<String>,
    pub source_origin: ContourOrigin,
    pub target_origin: ContourOrigin,
}

impl MatchedPolygonPair {
    /// The target re-indexed so that point `i` corresponds to `source[i]`.
    #[must_use]
    pub fn aligned_target(&self) -> Polygon {
        Polygon::new(rotated(&self.target.points, self.offset), self.target.closed)
    }
}

#[derive(Debug)]
struct Frames {
    pairs: Vec<MatchedPolygonPair>,
    /// Pre-rotated targets, one per pair.
    targets: Vec<Polygon>,
}

/// Pure function from progress `t` to an in-between shape.
///
/// Cloning is cheap; clones share the same immutable data. Evaluation never
/// fails and never mutates anything, so one instance may be evaluated from
/// several threads at once.
#[derive(Debug, Clone)]
pub struct MorphFunction {
    frames: Arc<Frames>,
}

impl MorphFunction {
    fn new(pairs: Vec<MatchedPolygonPair>) -> Self {
        let targets = pairs.iter().map(MatchedPolygonPair::aligned_target).collect();
        Self {
            frames: Arc::new(Frames { pairs, targets }),
        }
    }

    /// The matched polygon pairs, in output contour order.
    #[must_use]
    pub fn pairs(&self) -> &[MatchedPolygonPair] {
        &self.frames.pairs
    }

    /// Interpolated polygons at progress `t`.
    ///
    /// `t` is clamped to `[0, 1]` (NaN counts as 0). At `t = 0` the result
    /// is exactly the matched source polygons; at `t = 1` exactly the
    /// aligned target polygons.
    #[must_use]
    pub fn evaluate_polygons(&self, t: f64) -> Vec<Polygon> {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let frames = &*self.frames;
        frames
            .pairs
            .iter()
            .zip(&frames.targets)
            .map(|(pair, target)| {
                if t <= 0.0 {
                    return pair.source.clone();
                }
                if t >= 1.0 {
                    return target.clone();
                }
                let points = pair
                    .source
                    .points
                    .iter()
                    .zip(&target.points)
                    .map(|(a, b)| lerp(a, b, t))
                    .collect();
                Polygon::new(points, pair.source.closed || target.closed)
            })
            .collect()
    }

    /// Interpolated shape at progress `t`, one line contour per pair.
    #[must_use]
    pub fn evaluate(&self, t: f64) -> PathShape {
        self.evaluate_polygons(t)
            .iter()
            .zip(&self.frames.pairs)
            .map(|(polygon, pair)| polygon.to_contour(pair.key.clone()))
            .collect()
    }

    /// Interpolated shape at progress `t` as path data.
    #[must_use]
    pub fn evaluate_path_data(&self, t: f64) -> String {
        write_path_data(&self.evaluate(t), &PathDataOptions::default())
    }

    /// The shape at `t = 0`.
    #[must_use]
    pub fn source(&self) -> PathShape {
        self.evaluate(0.0)
    }

    /// The shape at `t = 1`.
    #[must_use]
    pub fn target(&self) -> PathShape {
        self.evaluate(1.0)
    }
}

/// Builds a [`MorphFunction`] from two shapes.
#[derive(Debug)]
pub struct BuildMorph<'a> {
    a: &'a PathShape,
    b: &'a PathShape,
    options: &'a MorphOptions,
}

impl<'a> BuildMorph<'a> {
    /// Creates a new build operation.
    #[must_use]
    pub fn new(a: &'a PathShape, b: &'a PathShape, options: &'a MorphOptions) -> Self {
        Self { a, b, options }
    }

    /// Executes the build: pair, discretize, equalize, align.
    ///
    /// Everything the returned function needs is checked here, so evaluation
    /// cannot fail later.
    ///
    /// # Errors
    ///
    /// Returns `MorphError::InvalidOptions` for bad options,
    /// `MorphError::MalformedShape` for bad input, and
    /// `MorphError::InternalInconsistency` if an internal invariant breaks.
    pub fn execute(&self) -> Result<MorphFunction> {
        self.options.validate()?;
        self.a.validate()?;
        self.b.validate()?;

        let pairing = MatchContours::new(self.a, self.b)
            .with_key_map(self.options.key_map.as_ref())
            .with_mismatch(self.options.mismatch)
            .execute()?;
        let pairs = self.match_polygons(pairing)?;

        debug!(
            source_contours = self.a.len(),
            target_contours = self.b.len(),
            pairs = pairs.len(),
            points = pairs.iter().map(|p| p.source.len()).sum::<usize>(),
            "built morph"
        );
        Ok(MorphFunction::new(pairs))
    }

    fn match_polygons(&self, pairing: ContourPairing) -> Result<Vec<MatchedPolygonPair>> {
        // A fixed point count replaces automatic equalization: both sides
        // are sampled to exactly that many points. Point stand-ins sample to
        // two and are padded up by the equalizer.
        let accuracy = self
            .options
            .point_count
            .map_or(self.options.accuracy, AccuracySpec::SampleCount);
        pairing
            .pairs
            .into_iter()
            .map(|pair| {
                let a = discretize_contour(&pair.source, accuracy)?;
                let b = discretize_contour(&pair.target, accuracy)?;
                let mut equalize = Equalize::new(&a, &b);
                if let Some(count) = self.options.point_count {
                    equalize = equalize.with_target(count);
                }
                let (source, mut target) = equalize.execute();

                if self.options.normalize_winding && source.closed && target.closed {
                    let (sa, sb) = (source.signed_area(), target.signed_area());
                    if sa * sb < 0.0 {
                        target = target.reversed();
                    }
                }

                let offset = Align::new(&source, &target)
                    .with_search(self.options.alignment)
                    .execute()?;
                debug!(points = source.len(), offset, "matched contour pair");

                Ok(MatchedPolygonPair {
                    key: pair.source.key.clone().or_else(|| pair.target.key.clone()),
                    source,
                    target,
                    offset,
                    source_origin: pair.source_origin,
                    target_origin: pair.target_origin,
                })
            })
            .collect()
    }
}

/// Builds a morph between `a` and `b`.
///
/// # Errors
///
/// See [`BuildMorph::execute`].
pub fn build(a: &PathShape, b: &PathShape, options: &MorphOptions) -> Result<MorphFunction> {
    BuildMorph::new(a, b, options).execute()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::MorphError;
    use crate::geometry::Contour;
    use crate::math::Point2;
    use approx::assert_abs_diff_eq;

    fn triangle() -> PathShape {
        PathShape::new(vec![Contour::from_points(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, 1.0),
            ],
            true,
        )])
    }

    fn square(x: f64) -> PathShape {
        PathShape::rect(Point2::new(x, 0.0), 2.0, 2.0)
    }

    #[test]
    fn endpoints_are_exact() {
        let f = build(&square(0.0), &PathShape::circle(Point2::new(7.0, 3.0), 2.5), &MorphOptions::default())
            .unwrap();
        let pair = &f.pairs()[0];
        assert_eq!(f.evaluate_polygons(0.0)[0], pair.source);
        assert_eq!(f.evaluate_polygons(1.0)[0], pair.aligned_target());
        // Out of order and out of range.
        assert_eq!(f.evaluate_polygons(7.0), f.evaluate_polygons(1.0));
        assert_eq!(f.evaluate_polygons(-0.5), f.evaluate_polygons(0.0));
        assert_eq!(f.evaluate_polygons(f64::NAN), f.evaluate_polygons(0.0));
    }

    #[test]
    fn interior_points_stay_on_their_segment() {
        let f = build(&square(0.0), &square(10.0), &MorphOptions::default()).unwrap();
        let start = f.evaluate_polygons(0.0);
        let end = f.evaluate_polygons(1.0);
        for t in [0.1, 0.25, 0.5, 0.9] {
            let mid = f.evaluate_polygons(t);
            for ((a, b), m) in start[0].points.iter().zip(&end[0].points).zip(&mid[0].points) {
                assert_abs_diff_eq!(m.x, a.x + t * (b.x - a.x), epsilon = 1e-12);
                assert_abs_diff_eq!(m.y, a.y + t * (b.y - a.y), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn equal_count_fast_path() {
        let f = build(&square(0.0), &square(5.0), &MorphOptions::default()).unwrap();
        let pair = &f.pairs()[0];
        assert_eq!(pair.offset, 0);
        assert_eq!(pair.source.len(), 4);
        assert_eq!(pair.target.len(), 4);
    }

    #[test]
    fn grows_from_a_point() {
        let f = build(&PathShape::default(), &triangle(), &MorphOptions::default()).unwrap();
        let start = f.evaluate_polygons(0.0);
        assert_eq!(start.len(), 1);
        assert_eq!(start[0].len(), 3);
        for p in &start[0].points {
            assert_abs_diff_eq!(p.x, 1.0 / 3.0, epsilon = 1e-12);
            assert_abs_diff_eq!(p.y, 1.0 / 3.0, epsilon = 1e-12);
        }
        assert_eq!(
            f.evaluate_polygons(1.0)[0].points,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, 1.0),
            ]
        );
    }

    #[test]
    fn fixed_point_count() {
        let options = MorphOptions::default().with_point_count(32);
        let f = build(&square(0.0), &triangle(), &options).unwrap();
        assert_eq!(f.pairs()[0].source.len(), 32);
        assert_eq!(f.pairs()[0].target.len(), 32);
    }

    #[test]
    fn fixed_point_count_overrides_dense_accuracy() {
        let options = MorphOptions::default()
            .with_accuracy(AccuracySpec::MaxSegmentLength(0.5))
            .with_point_count(16);
        let circle = PathShape::circle(Point2::new(0.0, 0.0), 10.0);
        let rect = PathShape::rect(Point2::new(0.0, 0.0), 4.0, 4.0);
        let f = build(&circle, &rect, &options).unwrap();
        assert_eq!(f.pairs()[0].source.len(), 16);
        assert_eq!(f.pairs()[0].target.len(), 16);
        assert_eq!(f.evaluate_polygons(0.5)[0].len(), 16);

        let grown = build(&PathShape::default(), &triangle(), &options).unwrap();
        assert_eq!(grown.pairs()[0].source.len(), 16);
        assert_eq!(grown.pairs()[0].target.len(), 16);
    }

    #[test]
    fn winding_normalization_reverses_target() {
        let mut ccw = triangle();
        let reversed: Vec<Point2> = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 0.0),
        ];
        let cw = PathShape::new(vec![Contour::from_points(&reversed, true)]);
        ccw.contours[0].key = Some("t".to_owned());

        let plain = build(&ccw, &cw, &MorphOptions::default()).unwrap();
        assert!(plain.pairs()[0].target.signed_area() < 0.0);

        let options = MorphOptions::default().with_normalized_winding(true);
        let normalized = build(&ccw, &cw, &options).unwrap();
        assert!(normalized.pairs()[0].target.signed_area() > 0.0);
        assert_eq!(normalized.pairs()[0].key.as_deref(), Some("t"));
        // Same triangle, same winding: the morph stands still.
        assert_eq!(
            normalized.evaluate_polygons(0.5)[0].points,
            normalized.evaluate_polygons(0.0)[0].points
        );
    }

    #[test]
    fn errors_surface_at_build_time() {
        let bad = PathShape::new(vec![
            Contour::new(Point2::new(0.0, 0.0)).line_to(Point2::new(f64::NAN, 1.0))
        ]);
        assert!(matches!(
            build(&bad, &square(0.0), &MorphOptions::default()),
            Err(MorphError::MalformedShape(_))
        ));
        let options = MorphOptions::default().with_accuracy(AccuracySpec::MaxSegmentLength(-1.0));
        assert!(matches!(
            build(&square(0.0), &square(1.0), &options),
            Err(MorphError::InvalidOptions(_))
        ));
    }

    #[test]
    fn path_data_output() {
        let f = build(&square(0.0), &square(2.0), &MorphOptions::default()).unwrap();
        assert_eq!(f.evaluate_path_data(0.0), "M0 0L2 0L2 2L0 2Z");
        assert_eq!(f.evaluate_path_data(0.5), "M1 0L3 0L3 2L1 2Z");
    }

    #[test]
    fn clones_share_frames_across_threads() {
        let f = build(&square(0.0), &square(4.0), &MorphOptions::default()).unwrap();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let f = f.clone();
                std::thread::spawn(move || f.evaluate(f64::from(i) / 4.0))
            })
            .collect();
        let results: Vec<PathShape> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results[0], f.evaluate(0.0));
        assert_eq!(results[2], f.evaluate(0.5));
    }
}
