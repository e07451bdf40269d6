//! Centerline offsetting.
//!
//! Every centerline vertex is pushed along the normal of its tangent. End
//! vertices take the direction of their single segment; interior vertices
//! take the normalized sum of the incoming and outgoing unit directions
//! (an averaged tangent). The true distance to the centerline therefore
//! shrinks at sharp corners, which is accepted for beam outlines.

use footing_core::{Side, Vertex};
use nalgebra::{Point2, Vector2};

use crate::polyline::to_point;

/// Directions shorter than this are treated as zero.
const DIRECTION_EPSILON: f64 = 1e-12;

/// Offsets a centerline by `distance` to one side.
///
/// Returns `None` when the centerline has fewer than 2 vertices or all of
/// its vertices coincide. The result always has as many vertices as the
/// centerline, each keeping its source elevation.
pub fn offset(centerline: &[Vertex], distance: f64, side: Side) -> Option<Vec<Vertex>> {
    if centerline.len() < 2 {
        return None;
    }

    let points: Vec<Point2<f64>> = centerline.iter().map(to_point).collect();
    let signed = distance * side.sign();

    let mut result = Vec::with_capacity(points.len());
    for (i, source) in centerline.iter().enumerate() {
        let tangent = vertex_tangent(&points, i)?;
        // Left-hand normal of the walking direction
        let normal = Vector2::new(-tangent.y, tangent.x);
        let p = points[i] + normal * signed;
        result.push(Vertex {
            x: p.x,
            y: p.y,
            elevation: source.elevation,
        });
    }
    Some(result)
}

/// Unit direction of segment `i` (from vertex `i` to `i + 1`).
fn segment_direction(points: &[Point2<f64>], i: usize) -> Option<Vector2<f64>> {
    (points[i + 1] - points[i]).try_normalize(DIRECTION_EPSILON)
}

/// Averaged unit tangent at vertex `i`.
///
/// Zero-length segments are skipped so repeated vertices borrow the
/// direction of the nearest real segment.
fn vertex_tangent(points: &[Point2<f64>], i: usize) -> Option<Vector2<f64>> {
    let incoming = (0..i).rev().find_map(|s| segment_direction(points, s));
    let outgoing = (i..points.len() - 1).find_map(|s| segment_direction(points, s));

    match (incoming, outgoing) {
        (Some(a), Some(b)) => (a + b).try_normalize(DIRECTION_EPSILON).or(Some(a)),
        (Some(d), None) | (None, Some(d)) => Some(d),
        (None, None) => None,
    }
}
