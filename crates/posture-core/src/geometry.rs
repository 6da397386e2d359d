//! Geometric utilities over 2D landmark positions.
//!
//! Formulas keep a fixed operand order (which point is subtracted from which)
//! so that sign-dependent findings such as tilt direction stay stable.

use nalgebra::{Point2, Vector2};

/// Component-wise average of two points
pub fn midpoint(a: &Point2<f64>, b: &Point2<f64>) -> Point2<f64> {
    Point2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Signed direction of a vector in degrees, `atan2(y, x)`
pub fn direction_degrees(v: &Vector2<f64>) -> f64 {
    v.y.atan2(v.x) * 180.0 / std::f64::consts::PI
}

/// Calculate angle between two vectors in degrees.
///
/// Returns `None` when either vector has zero length.
pub fn angle_between_degrees(v1: &Vector2<f64>, v2: &Vector2<f64>) -> Option<f64> {
    let n1 = v1.norm();
    let n2 = v2.norm();
    if n1 == 0.0 || n2 == 0.0 {
        return None;
    }

    let cos_angle = v1.dot(v2) / (n1 * n2);
    Some(cos_angle.clamp(-1.0, 1.0).acos() * 180.0 / std::f64::consts::PI)
}

/// Perpendicular distance of `point` from the line through `start` and `end`.
///
/// Computed by projecting `point - start` onto `end - start`. The radicand is
/// floored at zero so collinear points give exactly 0. Returns `None` for a
/// zero-length line.
pub fn perpendicular_distance(
    point: &Point2<f64>,
    start: &Point2<f64>,
    end: &Point2<f64>,
) -> Option<f64> {
    let line = end - start;
    let to_point = point - start;

    let line_length = line.norm();
    if line_length == 0.0 {
        return None;
    }

    let projection = to_point.dot(&line) / line_length;
    Some((to_point.norm_squared() - projection * projection).max(0.0).sqrt())
}
