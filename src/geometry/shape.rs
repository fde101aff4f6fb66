use crate::error::Result;
use crate::math::{Point2, Vector2};

use super::Contour;

/// An ordered list of contours: one drawable path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathShape {
    pub contours: Vec<Contour>,
}

impl PathShape {
    /// Creates a shape from contours.
    #[must_use]
    pub fn new(contours: Vec<Contour>) -> Self {
        Self { contours }
    }

    /// Number of contours.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contours.len()
    }

    /// Returns `true` if the shape has no contours.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Validates every contour.
    ///
    /// # Errors
    ///
    /// Returns `MorphError::MalformedShape` for the first offending contour.
    pub fn validate(&self) -> Result<()> {
        self.contours
            .iter()
            .enumerate()
            .try_for_each(|(i, c)| c.validate(i))
    }

    /// Closed circle built from two semicircular arcs, starting at the
    /// leftmost point.
    #[must_use]
    pub fn circle(center: Point2, radius: f64) -> Self {
        let radii = Vector2::new(radius, radius);
        let left = Point2::new(center.x - radius, center.y);
        let right = Point2::new(center.x + radius, center.y);
        Self::new(vec![Contour::new(left)
            .arc_to(radii, 0.0, false, true, right)
            .arc_to(radii, 0.0, false, true, left)
            .close()])
    }

    /// Closed axis-aligned rectangle starting at `origin`.
    #[must_use]
    pub fn rect(origin: Point2, width: f64, height: f64) -> Self {
        Self::new(vec![Contour::new(origin)
            .line_to(Point2::new(origin.x + width, origin.y))
            .line_to(Point2::new(origin.x + width, origin.y + height))
            .line_to(Point2::new(origin.x, origin.y + height))
            .close()])
    }

    /// Appends the contours of `other`.
    #[must_use]
    pub fn combined(mut self, other: Self) -> Self {
        self.contours.extend(other.contours);
        self
    }

    /// Sets the same key on every contour.
    #[must_use]
    pub fn with_key(mut self, key: &str) -> Self {
        for c in &mut self.contours {
            c.key = Some(key.to_owned());
        }
        self
    }
}

impl FromIterator<Contour> for PathShape {
    fn from_iter<I: IntoIterator<Item = Contour>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
