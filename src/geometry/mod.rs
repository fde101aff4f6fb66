mod contour;
mod polygon;
mod segment;
mod shape;

pub use contour::Contour;
pub use polygon::Polygon;
pub use segment::Segment;
pub use shape::PathShape;
