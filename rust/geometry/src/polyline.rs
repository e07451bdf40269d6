//! Polyline primitives shared by the kernel functions.
//!
//! Polylines are plain `[Vertex]` slices with straight segments between
//! consecutive vertices. Math happens on nalgebra points; elevations ride
//! along on the vertices.

use footing_core::Vertex;
use nalgebra::Point2;

/// An open polyline.
pub type Polyline = Vec<Vertex>;

/// Projects a vertex onto the drawing plane.
#[inline]
pub fn to_point(v: &Vertex) -> Point2<f64> {
    Point2::new(v.x, v.y)
}

/// Lifts a planar point back to a vertex with the given elevation.
#[inline]
pub fn to_vertex(p: &Point2<f64>, elevation: Option<f64>) -> Vertex {
    Vertex {
        x: p.x,
        y: p.y,
        elevation,
    }
}

/// Total planar length of a polyline.
pub fn length(polyline: &[Vertex]) -> f64 {
    polyline.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

/// Point halfway along a polyline (by arc length).
pub fn midpoint(polyline: &[Vertex]) -> Option<Point2<f64>> {
    match polyline {
        [] => None,
        [only] => Some(to_point(only)),
        _ => {
            let half = length(polyline) * 0.5;
            let mut walked = 0.0;
            for w in polyline.windows(2) {
                let seg = w[0].distance(&w[1]);
                if walked + seg >= half && seg > 0.0 {
                    let t = (half - walked) / seg;
                    let a = to_point(&w[0]);
                    let b = to_point(&w[1]);
                    return Some(a + (b - a) * t);
                }
                walked += seg;
            }
            polyline.last().map(to_point)
        }
    }
}

/// Closest point to `p` on the segment `a`-`b`.
pub fn closest_point_on_segment(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> Point2<f64> {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return *a;
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Closest point to `p` on a polyline, or `None` for an empty polyline.
pub fn closest_point(polyline: &[Vertex], p: &Point2<f64>) -> Option<Point2<f64>> {
    if polyline.len() == 1 {
        return Some(to_point(&polyline[0]));
    }
    polyline
        .windows(2)
        .map(|w| closest_point_on_segment(p, &to_point(&w[0]), &to_point(&w[1])))
        .min_by(|x, y| (x - p).norm_squared().total_cmp(&(y - p).norm_squared()))
}
