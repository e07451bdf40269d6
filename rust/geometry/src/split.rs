//! Curve splitting at cut points.

use footing_core::Vertex;
use nalgebra::Point2;

use crate::polyline::{to_point, to_vertex, Polyline};

/// Splits `curve` at its own vertices and at `cuts`, returning one
/// two-point piece per consecutive pair.
///
/// Points closer than `tolerance` to an already collected point are
/// dropped (the curve's own vertices win), the rest are ordered by their
/// distance from the curve's start point, and pieces no longer than
/// `tolerance` are discarded.
///
/// Ordering by distance from the start is only correct while that distance
/// grows monotonically along the curve (straight runs and gentle bends).
/// Curves that fold back towards their start are split anyway, with a
/// warning.
pub fn split(curve: &[Vertex], cuts: &[Point2<f64>], tolerance: f64) -> Vec<Polyline> {
    let Some(first) = curve.first() else {
        return Vec::new();
    };
    let start = to_point(first);

    if !distance_is_monotonic(curve, &start) {
        tracing::warn!(
            vertices = curve.len(),
            "splitting a curve that folds back towards its start; piece order may be wrong"
        );
    }

    let mut points: Vec<Vertex> = Vec::with_capacity(curve.len() + cuts.len());
    let candidates = curve
        .iter()
        .copied()
        .chain(cuts.iter().map(|p| to_vertex(p, first.elevation)));
    for candidate in candidates {
        if points.iter().all(|p| p.distance(&candidate) > tolerance) {
            points.push(candidate);
        }
    }

    let distance_from_start = |v: &Vertex| (to_point(v) - start).norm();
    points.sort_by(|a, b| distance_from_start(a).total_cmp(&distance_from_start(b)));

    points
        .windows(2)
        .filter(|w| w[0].distance(&w[1]) > tolerance)
        .map(|w| vec![w[0], w[1]])
        .collect()
}

fn distance_is_monotonic(curve: &[Vertex], start: &Point2<f64>) -> bool {
    curve
        .windows(2)
        .all(|w| (to_point(&w[1]) - start).norm() >= (to_point(&w[0]) - start).norm())
}
