//! Beam footprint containment.
//!
//! A beam's band is the strip between its left and right edges. The test
//! here approximates containment: the point is projected onto the chord
//! joining its closest points on both edges, and counts as inside when the
//! projection falls on that chord. Points past either end cap of the band
//! are rejected, so bands of collinear beams that merely line up end to end
//! do not swallow each other.

use footing_core::Vertex;
use nalgebra::{Point2, Vector2};

use crate::polyline::{closest_point, to_point};

#[inline]
fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Returns `true` if `point` lies within the band between `left` and `right`,
/// or within `tolerance` of its boundary.
///
/// Boundary points count as inside. Points beyond either end cap are
/// rejected even when they project onto the chord, and the chord parameter
/// slack is `tolerance / chord_len` so it stays a distance.
pub fn point_in_band(point: &Point2<f64>, left: &[Vertex], right: &[Vertex], tolerance: f64) -> bool {
    let (Some(l), Some(r)) = (closest_point(left, point), closest_point(right, point)) else {
        return false;
    };

    let chord = r - l;
    let chord_len = chord.norm();
    if chord_len <= tolerance {
        // Collapsed band: only points on the edge itself are inside
        return (point - l).norm() <= tolerance;
    }

    let t = (point - l).dot(&chord) / (chord_len * chord_len);
    let slack = tolerance / chord_len;
    if t < -slack || t > 1.0 + slack {
        return false;
    }

    within_cap(point, left, right, CapEnd::Start, tolerance)
        && within_cap(point, left, right, CapEnd::End, tolerance)
}

#[derive(Clone, Copy)]
enum CapEnd {
    Start,
    End,
}

/// Checks that `point` is not beyond the cap joining the band's first (or
/// last) left and right vertices.
fn within_cap(point: &Point2<f64>, left: &[Vertex], right: &[Vertex], end: CapEnd, tolerance: f64) -> bool {
    if left.len() < 2 || right.len() < 2 {
        return true;
    }

    let (cap_l, cap_r, inner_l, inner_r) = match end {
        CapEnd::Start => (&left[0], &right[0], &left[1], &right[1]),
        CapEnd::End => {
            let (nl, nr) = (left.len(), right.len());
            (&left[nl - 1], &right[nr - 1], &left[nl - 2], &right[nr - 2])
        }
    };

    let a = to_point(cap_l);
    let cap = to_point(cap_r) - a;
    let cap_len = cap.norm();
    if cap_len <= tolerance {
        return true;
    }

    let inner = nalgebra::center(&to_point(inner_l), &to_point(inner_r));
    let inward = cross(&cap, &(inner - a)).signum();
    if inward == 0.0 {
        return true;
    }

    // Signed distance from the cap line, positive towards the band interior
    let signed = inward * cross(&cap, &(point - a)) / cap_len;
    signed >= -tolerance
}
