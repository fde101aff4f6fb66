//! 2D shape morphing: discretize path shapes into polygons, match their
//! contours and vertices, and build a function from progress to shape.

pub mod discretize;
pub mod error;
pub mod export;
pub mod geometry;
pub mod math;
pub mod morph;

pub use discretize::{discretize, AccuracySpec};
pub use error::{MorphError, Result};
pub use geometry::{Contour, PathShape, Polygon, Segment};
pub use morph::{build, pair, MorphFunction, MorphOptions};
