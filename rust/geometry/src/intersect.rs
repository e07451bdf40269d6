//! Segment and polyline intersection.

use footing_core::Vertex;
use nalgebra::{Point2, Vector2};

use crate::polyline::to_point;

/// Slack on the segment parameters so touching endpoints still intersect.
const PARAM_EPSILON: f64 = 1e-9;

#[inline]
fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Intersects segment `a0`-`a1` with segment `b0`-`b1`.
///
/// Both segment parameters must lie in `[0, 1]` (inclusive), so segments
/// that merely touch at an endpoint intersect. Parallel and collinear
/// segments, and zero-length segments, have no intersection point.
pub fn intersect_segments(
    a0: &Point2<f64>,
    a1: &Point2<f64>,
    b0: &Point2<f64>,
    b1: &Point2<f64>,
) -> Option<Point2<f64>> {
    let r = a1 - a0;
    let s = b1 - b0;
    let denom = cross(&r, &s);

    // Relative test so large and small drawings behave the same
    if denom.abs() <= f64::EPSILON * r.norm() * s.norm() || denom == 0.0 {
        return None;
    }

    let qp = b0 - a0;
    let t = cross(&qp, &s) / denom;
    let u = cross(&qp, &r) / denom;

    let range = -PARAM_EPSILON..=1.0 + PARAM_EPSILON;
    if range.contains(&t) && range.contains(&u) {
        Some(a0 + r * t.clamp(0.0, 1.0))
    } else {
        None
    }
}

/// Collects every point where polyline `a` crosses or touches polyline `b`.
pub fn polyline_intersections(a: &[Vertex], b: &[Vertex]) -> Vec<Point2<f64>> {
    let mut points = Vec::new();
    for sa in a.windows(2) {
        let (a0, a1) = (to_point(&sa[0]), to_point(&sa[1]));
        for sb in b.windows(2) {
            if let Some(p) = intersect_segments(&a0, &a1, &to_point(&sb[0]), &to_point(&sb[1])) {
                points.push(p);
            }
        }
    }
    points
}
