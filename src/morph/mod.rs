//! Shape interpolation: contour matching, point-count equalization,
//! cyclic alignment and the resulting progress → shape function.

mod align;
mod equalize;
mod interpolator;
mod options;
mod pairing;

pub use align::{align, Align};
pub use equalize::{equalize, refine_to, Equalize};
pub use interpolator::{build, BuildMorph, MatchedPolygonPair, MorphFunction};
pub use options::{AlignmentSearch, ContourMismatch, MorphOptions};
pub use pairing::{pair, ContourOrigin, ContourPair, ContourPairing, MatchContours, Side};
