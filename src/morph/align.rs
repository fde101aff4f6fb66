use crate::error::{InternalError, Result};
use crate::geometry::Polygon;

use super::options::AlignmentSearch;

/// Finds the cyclic offset `k` of `b` that best matches `a`, so that
/// `a[i]` travels to `b[(i + k) % n]` with the least total squared distance.
#[derive(Debug)]
pub struct Align<'a> {
    a: &'a Polygon,
    b: &'a Polygon,
    search: AlignmentSearch,
}

impl<'a> Align<'a> {
    /// Creates a new alignment of two equal-length polygons.
    #[must_use]
    pub fn new(a: &'a Polygon, b: &'a Polygon) -> Self {
        Self {
            a,
            b,
            search: AlignmentSearch::Exhaustive,
        }
    }

    /// Chooses how many candidate offsets are scored.
    #[must_use]
    pub fn with_search(mut self, search: AlignmentSearch) -> Self {
        self.search = search;
        self
    }

    /// Executes the alignment, returning the offset.
    ///
    /// Open polygons have no cyclic freedom: if either side is open the
    /// offset is 0, whatever their traversal directions are.
    ///
    /// # Errors
    ///
    /// Returns `MorphError::InternalInconsistency` if the point counts differ.
    pub fn execute(&self) -> Result<usize> {
        let n = self.a.len();
        if n != self.b.len() {
            return Err(InternalError::CountMismatch {
                left: n,
                right: self.b.len(),
            }
            .into());
        }
        if n < 2 || !self.a.closed || !self.b.closed {
            return Ok(0);
        }

        match self.search {
            AlignmentSearch::Strided { max_candidates } if n > max_candidates => {
                Ok(self.strided(max_candidates))
            }
            _ => Ok(self.best_of(0..n)),
        }
    }

    fn strided(&self, max_candidates: usize) -> usize {
        let n = self.a.len();
        let stride = n.div_ceil(max_candidates.max(1));
        let coarse = self.best_of((0..n).step_by(stride));
        let window = (coarse + n - stride..=coarse + n + stride).map(|k| k % n);
        self.best_of(window)
    }

    /// Lowest score wins; ties go to the smallest offset.
    fn best_of(&self, candidates: impl Iterator<Item = usize>) -> usize {
        let mut best = (f64::INFINITY, usize::MAX);
        for k in candidates {
            let score = self.score(k);
            if score < best.0 || (score == best.0 && k < best.1) {
                best = (score, k);
            }
        }
        if best.1 == usize::MAX {
            0
        } else {
            best.1
        }
    }

    fn score(&self, k: usize) -> f64 {
        let a = &self.a.points;
        let b = &self.b.points;
        let n = a.len();
        a.iter()
            .enumerate()
            .map(|(i, p)| (b[(i + k) % n] - p).norm_squared())
            .sum()
    }
}

/// Exhaustively aligns two equal-length polygons.
///
/// # Errors
///
/// See [`Align::execute`].
pub fn align(a: &Polygon, b: &Polygon) -> Result<usize> {
    Align::new(a, b).execute()
}
