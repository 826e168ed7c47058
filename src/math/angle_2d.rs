use std::f64::consts::TAU;

use super::Vector2;

/// Polar angle of a vector in `(-π, π]`.
#[must_use]
pub fn vector_angle(v: &Vector2) -> f64 {
    v.y.atan2(v.x)
}

/// Counter-clockwise angle from `reference` to `angle`, normalized to `[0, 2π)`.
#[must_use]
pub fn ccw_offset(angle: f64, reference: f64) -> f64 {
    let da = angle - reference;
    if da < 0.0 {
        da + TAU
    } else {
        da
    }
}

/// Left-hand normal `(-y, x)` of a (not necessarily unit) tangent.
#[must_use]
pub fn left_normal(tangent: &Vector2) -> Vector2 {
    Vector2::new(-tangent.y, tangent.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn angles_of_axes() {
        assert_abs_diff_eq!(vector_angle(&Vector2::new(1.0, 0.0)), 0.0);
        assert_abs_diff_eq!(vector_angle(&Vector2::new(0.0, 2.0)), FRAC_PI_2);
        assert_abs_diff_eq!(vector_angle(&Vector2::new(-1.0, 0.0)), PI);
    }

    #[test]
    fn offset_wraps_negative_differences() {
        assert_abs_diff_eq!(ccw_offset(FRAC_PI_2, 0.0), FRAC_PI_2);
        assert_abs_diff_eq!(ccw_offset(0.0, FRAC_PI_2), 3.0 * FRAC_PI_2);
        assert_abs_diff_eq!(ccw_offset(1.0, 1.0), 0.0);
    }

    #[test]
    fn left_normal_rotates_ccw() {
        let n = left_normal(&Vector2::new(2.0, 0.0));
        assert_abs_diff_eq!(n.x, 0.0);
        assert_abs_diff_eq!(n.y, 2.0);
    }
}
