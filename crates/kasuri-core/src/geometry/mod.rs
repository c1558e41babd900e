pub mod homography;
pub mod linalg;
pub mod point;
pub mod quad;

pub use homography::Homography;
pub use point::Point2;
pub use quad::{CalibrationQuad, Corner};
