use nalgebra::Matrix2;

use super::{Point2, TOLERANCE};

/// Bounded intersection of the segment `p0 → p1` with the query segment `a → b`.
///
/// Solves `p0 + t0 * (p1 - p0) = a + t1 * (b - a)` and returns `(t0, t1)`.
///
/// Returns `None` when the segments are parallel, when the intersection falls
/// outside `[0, 1]` on the first segment, or when it lies within
/// [`TOLERANCE`] of `a` or `b` on the query segment. Touching the query
/// segment at its endpoints is therefore not reported as a crossing.
#[must_use]
pub fn segment_intersection(
    p0: &Point2,
    p1: &Point2,
    a: &Point2,
    b: &Point2,
) -> Option<(f64, f64)> {
    let mat = Matrix2::from_columns(&[p1 - p0, a - b]);
    let params = mat.lu().solve(&(a - p0))?;
    let (t0, t1) = (params.x, params.y);
    if (0.0..=1.0).contains(&t0) && (TOLERANCE..=1.0 - TOLERANCE).contains(&t1) {
        Some((t0, t1))
    } else {
        None
    }
}

/// Abscissae where the segment `p0 → p1` meets the horizontal line through `xy`.
///
/// Returns no value when the line misses the segment, a single value for a
/// regular crossing, and both endpoint abscissae when the segment is
/// horizontal within `tol` and lies on the line (within `tol`).
#[must_use]
pub fn x_line_intersections(p0: &Point2, p1: &Point2, xy: &Point2, tol: f64) -> Vec<f64> {
    let dy = p1.y - p0.y;
    if dy.abs() < tol {
        let (min_y, max_y) = if p0.y < p1.y { (p0.y, p1.y) } else { (p1.y, p0.y) };
        if min_y - tol <= xy.y && xy.y <= max_y + tol {
            vec![p0.x, p1.x]
        } else {
            Vec::new()
        }
    } else {
        let t = (xy.y - p0.y) / dy;
        if -tol < t && t < 1.0 + tol {
            vec![p0.x + t * (p1.x - p0.x)]
        } else {
            Vec::new()
        }
    }
}

/// Returns `true` if the segment `p0 → p1` crosses the rightward horizontal
/// ray starting at `xy`.
///
/// The vertical range is half-open (`min_y <= y < max_y`) so a ray passing
/// through a shared vertex is counted exactly once; horizontal segments never
/// cross.
#[must_use]
pub fn crosses_x_ray(p0: &Point2, p1: &Point2, xy: &Point2) -> bool {
    let (min_y, max_y) = if p0.y < p1.y { (p0.y, p1.y) } else { (p1.y, p0.y) };
    if !(min_y <= xy.y && xy.y < max_y) {
        return false;
    }
    let t = (xy.y - p0.y) / (p1.y - p0.y);
    p0.x + t * (p1.x - p0.x) > xy.x
}

/// Projects `xy` onto the segment `p0 → p1` along its dominant axis.
///
/// Returns the clamped parameter `t` if the projected point is within `tol`
/// of `xy` in the max norm.
#[must_use]
pub fn project_along_axis(p0: &Point2, p1: &Point2, xy: &Point2, tol: f64) -> Option<f64> {
    let d = p1 - p0;
    let t = if d.x.abs() >= d.y.abs() {
        (xy.x - p0.x) / d.x
    } else {
        (xy.y - p0.y) / d.y
    };
    let t = t.clamp(0.0, 1.0);
    let diff = xy - point_at(p0, p1, t);
    (diff.x.abs().max(diff.y.abs()) < tol).then_some(t)
}

/// Linear interpolation: `p0 + t * (p1 - p0)`.
#[must_use]
pub fn point_at(p0: &Point2, p1: &Point2, t: f64) -> Point2 {
    p0 + (p1 - p0) * t
}
