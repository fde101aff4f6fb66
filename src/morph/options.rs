use std::collections::BTreeMap;

use crate::discretize::{AccuracySpec, MAX_CONTOUR_POINTS};
use crate::error::{OptionsError, Result};

/// What to do when the two shapes have different contour counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContourMismatch {
    /// Cut the longest contours of the sparser side until counts match.
    #[default]
    Split,
    /// Merge nearest-centroid contours of the denser side until counts match.
    Merge,
}

/// How many cyclic offsets the aligner scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlignmentSearch {
    /// Score every offset: O(N²).
    #[default]
    Exhaustive,
    /// Score at most about `max_candidates` evenly strided offsets, then
    /// refine around the best one.
    Strided { max_candidates: usize },
}

/// Parameters controlling how a morph is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MorphOptions {
    /// Discretization resolution shared by both shapes.
    pub accuracy: AccuracySpec,
    /// Fixed number of points per matched polygon pair. When set it
    /// overrides `accuracy`: both sides are sampled evenly by arc length to
    /// exactly this many points.
    pub point_count: Option<usize>,
    /// Source contour key → target contour key. Named pairs take priority
    /// over positional pairing.
    pub key_map: Option<BTreeMap<String, String>>,
    pub mismatch: ContourMismatch,
    pub alignment: AlignmentSearch,
    /// Reverse closed target polygons whose winding disagrees with their
    /// source before aligning them.
    pub normalize_winding: bool,
}

impl MorphOptions {
    #[must_use]
    pub fn with_accuracy(mut self, accuracy: AccuracySpec) -> Self {
        self.accuracy = accuracy;
        self
    }

    #[must_use]
    pub fn with_point_count(mut self, count: usize) -> Self {
        self.point_count = Some(count);
        self
    }

    /// Adds a named pairing from a source key to a target key.
    #[must_use]
    pub fn with_key_pair(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.key_map
            .get_or_insert_with(BTreeMap::new)
            .insert(source.into(), target.into());
        self
    }

    #[must_use]
    pub fn with_mismatch(mut self, mismatch: ContourMismatch) -> Self {
        self.mismatch = mismatch;
        self
    }

    #[must_use]
    pub fn with_alignment(mut self, alignment: AlignmentSearch) -> Self {
        self.alignment = alignment;
        self
    }

    #[must_use]
    pub fn with_normalized_winding(mut self, normalize: bool) -> Self {
        self.normalize_winding = normalize;
        self
    }

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// Returns `MorphError::InvalidOptions` describing the first bad field.
    pub fn validate(&self) -> Result<()> {
        self.accuracy.validate()?;
        if let Some(count) = self.point_count {
            if count < 2 {
                return Err(OptionsError::TooSmall {
                    name: "point count",
                    value: count,
                    min: 2,
                }
                .into());
            }
            if count > MAX_CONTOUR_POINTS {
                return Err(OptionsError::TooLarge {
                    name: "point count",
                    value: count,
                    max: MAX_CONTOUR_POINTS,
                }
                .into());
            }
        }
        if let AlignmentSearch::Strided { max_candidates } = self.alignment {
            if max_candidates < 1 {
                return Err(OptionsError::TooSmall {
                    name: "alignment candidates",
                    value: max_candidates,
                    min: 1,
                }
                .into());
            }
        }
        Ok(())
    }
}
