pub mod angle_2d;
pub mod intersect_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Fixed tolerance for degenerate-geometry tie-breaks (touching endpoints,
/// boundary perturbation).
pub const TOLERANCE: f64 = 1e-10;

/// Default snapping distance for point location.
pub const DEFAULT_SNAP_TOLERANCE: f64 = 0.01;
