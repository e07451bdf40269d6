//! Rejoining pieces into continuous curves.
//!
//! Pieces are chained greedily: a chain grows forward while some unused
//! piece starts where the chain ends, then backward while some unused piece
//! ends where the chain starts. Endpoints are bucketed on a grid of
//! `tolerance`-sized cells, so each lookup inspects the 3×3 neighborhood of
//! one cell instead of every piece.

use std::collections::VecDeque;

use footing_core::Vertex;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::polyline::Polyline;

/// Smallest cell size, so a zero tolerance still buckets sensibly.
const MIN_CELL: f64 = 1e-9;

type Cell = (i64, i64);

struct EndpointIndex {
    cell: f64,
    tolerance: f64,
    starts: FxHashMap<Cell, SmallVec<[(usize, Vertex); 2]>>,
    ends: FxHashMap<Cell, SmallVec<[(usize, Vertex); 2]>>,
}

impl EndpointIndex {
    fn build(pieces: &[Polyline], tolerance: f64) -> Self {
        let mut index = Self {
            cell: tolerance.max(MIN_CELL),
            tolerance,
            starts: FxHashMap::default(),
            ends: FxHashMap::default(),
        };
        for (i, piece) in pieces.iter().enumerate() {
            if let (Some(first), Some(last)) = (piece.first(), piece.last()) {
                let cell = index.cell_of(first);
                index.starts.entry(cell).or_default().push((i, *first));
                let cell = index.cell_of(last);
                index.ends.entry(cell).or_default().push((i, *last));
            }
        }
        index
    }

    fn cell_of(&self, v: &Vertex) -> Cell {
        ((v.x / self.cell).floor() as i64, (v.y / self.cell).floor() as i64)
    }

    /// Lowest-numbered unused piece with an endpoint within tolerance of `at`.
    fn find(
        &self,
        buckets: &FxHashMap<Cell, SmallVec<[(usize, Vertex); 2]>>,
        at: &Vertex,
        used: &[bool],
    ) -> Option<usize> {
        let (cx, cy) = self.cell_of(at);
        let mut best: Option<usize> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = buckets.get(&(cx.saturating_add(dx), cy.saturating_add(dy))) else {
                    continue;
                };
                for &(i, endpoint) in bucket {
                    if !used[i] && endpoint.distance(at) <= self.tolerance {
                        best = Some(best.map_or(i, |b| b.min(i)));
                    }
                }
            }
        }
        best
    }
}

/// Chains pieces that share endpoints (within `tolerance`) into longer
/// curves. Every piece is used at most once; pieces that match nothing come
/// back unchanged. Empty pieces are dropped.
pub fn join(pieces: &[Polyline], tolerance: f64) -> Vec<Polyline> {
    let index = EndpointIndex::build(pieces, tolerance);
    let mut used = vec![false; pieces.len()];
    let mut curves = Vec::new();

    for seed in 0..pieces.len() {
        if used[seed] || pieces[seed].is_empty() {
            continue;
        }
        used[seed] = true;
        let mut chain: VecDeque<Vertex> = pieces[seed].iter().copied().collect();

        loop {
            if let Some(&end) = chain.back() {
                if let Some(next) = index.find(&index.starts, &end, &used) {
                    used[next] = true;
                    chain.extend(pieces[next].iter().skip(1).copied());
                    continue;
                }
            }
            if let Some(&start) = chain.front() {
                if let Some(prev) = index.find(&index.ends, &start, &used) {
                    used[prev] = true;
                    for v in pieces[prev].iter().rev().skip(1) {
                        chain.push_front(*v);
                    }
                    continue;
                }
            }
            break;
        }

        curves.push(chain.into_iter().collect());
    }

    curves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::split;

    const TOL: f64 = 1e-6;

    fn seg(a: (f64, f64), b: (f64, f64)) -> Polyline {
        vec![Vertex::new(a.0, a.1), Vertex::new(b.0, b.1)]
    }

    #[test]
    fn chains_forward() {
        let pieces = vec![seg((0.0, 0.0), (1.0, 0.0)), seg((1.0, 0.0), (2.0, 0.0))];
        let curves = join(&pieces, TOL);
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].len(), 3);
    }

    #[test]
    fn chains_backward() {
        let pieces = vec![seg((1.0, 0.0), (2.0, 0.0)), seg((0.0, 0.0), (1.0, 0.0))];
        let curves = join(&pieces, TOL);
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].first(), Some(&Vertex::new(0.0, 0.0)));
        assert_eq!(curves[0].last(), Some(&Vertex::new(2.0, 0.0)));
    }

    #[test]
    fn gaps_stay_separate() {
        let pieces = vec![seg((0.0, 0.0), (44.0, 0.0)), seg((56.0, 0.0), (100.0, 0.0))];
        assert_eq!(join(&pieces, TOL).len(), 2);
    }

    #[test]
    fn does_not_reverse_pieces() {
        // Two pieces meeting head to head cannot chain without reversal
        let pieces = vec![seg((0.0, 0.0), (1.0, 0.0)), seg((2.0, 0.0), (1.0, 0.0))];
        assert_eq!(join(&pieces, TOL).len(), 2);
    }

    #[test]
    fn tolerance_bridges_tiny_gaps() {
        let pieces = vec![seg((0.0, 0.0), (1.0, 0.0)), seg((1.0 + TOL * 0.5, 0.0), (2.0, 0.0))];
        assert_eq!(join(&pieces, TOL).len(), 1);
    }

    #[test]
    fn each_piece_used_once() {
        // Two candidates start where the first piece ends
        let pieces = vec![
            seg((0.0, 0.0), (1.0, 0.0)),
            seg((1.0, 0.0), (2.0, 0.0)),
            seg((1.0, 0.0), (1.0, 5.0)),
        ];
        let curves = join(&pieces, TOL);
        assert_eq!(curves.len(), 2);
        let total: usize = curves.iter().map(|c| c.len() - 1).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn closed_loop_terminates() {
        let pieces = vec![
            seg((0.0, 0.0), (1.0, 0.0)),
            seg((1.0, 0.0), (1.0, 1.0)),
            seg((1.0, 1.0), (0.0, 0.0)),
        ];
        let curves = join(&pieces, TOL);
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].len(), 4);
    }

    #[test]
    fn split_then_join_restores_endpoints() {
        let curve = vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(30.0, 5.0),
            Vertex::new(60.0, 20.0),
            Vertex::new(100.0, 50.0),
        ];
        let pieces = split(&curve, &[], TOL);
        assert_eq!(pieces.len(), 3);
        let curves = join(&pieces, TOL);
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0], curve);
    }

    #[test]
    fn empty_pieces_are_dropped() {
        let pieces = vec![Vec::new(), seg((0.0, 0.0), (1.0, 0.0))];
        assert_eq!(join(&pieces, TOL).len(), 1);
    }
}
