// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use footing_core::{Handle, Side, Vertex};
use footing_geometry::polyline::midpoint;
use footing_geometry::{
    join, offset, point_in_band, split, BeamBand, BeamCenterline, EdgeSynthesizer,
    SynthesisConfig,
};

const TOL: f64 = 1e-6;

fn handle(v: u64) -> Handle {
    Handle::new(v).unwrap()
}

fn beam(h: u64, pts: &[(f64, f64)]) -> BeamCenterline {
    BeamCenterline::new(handle(h), pts.iter().map(|&p| Vertex::from(p)).collect())
}

fn synthesizer(half_width: f64) -> EdgeSynthesizer {
    EdgeSynthesizer::new(SynthesisConfig::with_half_width(half_width)).unwrap()
}

/// Asserts that no kept piece of any beam has its midpoint inside another
/// beam's band.
fn assert_no_overlaps(beams: &[BeamCenterline], half_width: f64) {
    let synth = synthesizer(half_width);
    let outcome = synth.synthesize(beams);
    let bands: Vec<BeamBand> = beams
        .iter()
        .filter_map(|b| BeamBand::from_centerline(b, half_width))
        .collect();

    for edges in &outcome.beams {
        for side in Side::BOTH {
            for curve in edges.side(side) {
                for piece in curve.windows(2) {
                    let mid = midpoint(piece).unwrap();
                    for band in bands.iter().filter(|b| b.handle != edges.handle) {
                        assert!(
                            !point_in_band(&mid, &band.left, &band.right, TOL),
                            "beam {} {} piece at ({:.3}, {:.3}) lies inside beam {}",
                            edges.handle,
                            side,
                            mid.x,
                            mid.y,
                            band.handle
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn scenario_a_crossing_beams() {
    let beams = [
        beam(0x1A2, &[(0.0, 0.0), (100.0, 0.0)]),
        beam(0x1A3, &[(50.0, -50.0), (50.0, 50.0)]),
    ];
    let outcome = synthesizer(6.0).synthesize(&beams);

    let horizontal = outcome.edges_of(handle(0x1A2)).unwrap();
    assert_eq!(horizontal.left.len(), 2);
    assert_eq!(horizontal.right.len(), 2);

    // Left edge at y = +6, gap between x = 44 and x = 56
    let left = &horizontal.left;
    assert_relative_eq!(left[0][0].x, 0.0);
    assert_relative_eq!(left[0][1].x, 44.0, epsilon = 1e-9);
    assert_relative_eq!(left[1][0].x, 56.0, epsilon = 1e-9);
    assert_relative_eq!(left[1][1].x, 100.0);
    for piece in left {
        for v in piece {
            assert_relative_eq!(v.y, 6.0);
        }
    }

    let vertical = outcome.edges_of(handle(0x1A3)).unwrap();
    assert_eq!(vertical.left.len(), 2);
    assert_eq!(vertical.right.len(), 2);
    assert_relative_eq!(vertical.left[0][1].y, -6.0, epsilon = 1e-9);
    assert_relative_eq!(vertical.left[1][0].y, 6.0, epsilon = 1e-9);

    assert_no_overlaps(&beams, 6.0);
}

#[test]
fn separated_beams_keep_whole_edges() {
    let beams = [
        beam(1, &[(0.0, 0.0), (100.0, 0.0)]),
        beam(2, &[(0.0, 40.0), (100.0, 40.0)]),
    ];
    let outcome = synthesizer(6.0).synthesize(&beams);
    assert_eq!(outcome.discarded_pieces, 0);
    for edges in &outcome.beams {
        assert_eq!(edges.left.len(), 1);
        assert_eq!(edges.right.len(), 1);
    }
    let original = offset(&beams[0].vertices, 6.0, Side::Left).unwrap();
    assert_eq!(outcome.beams[0].left[0], original);
}

#[test]
fn collinear_beams_end_to_end_keep_whole_edges() {
    let beams = [
        beam(1, &[(0.0, 0.0), (100.0, 0.0)]),
        beam(2, &[(200.0, 0.0), (300.0, 0.0)]),
    ];
    let outcome = synthesizer(6.0).synthesize(&beams);
    assert_eq!(outcome.discarded_pieces, 0);
    for edges in &outcome.beams {
        assert_eq!(edges.len(), 2);
    }
}

#[test]
fn bent_beams_far_apart_keep_one_edge_per_side() {
    let beams = [
        beam(1, &[(0.0, 0.0), (50.0, 0.0), (50.0, 50.0), (100.0, 80.0)]),
        beam(2, &[(300.0, 0.0), (400.0, 0.0)]),
    ];
    let outcome = synthesizer(6.0).synthesize(&beams);
    let edges = outcome.edges_of(handle(1)).unwrap();
    assert_eq!(edges.left.len(), 1);
    assert_eq!(edges.right.len(), 1);
    assert_eq!(edges.left[0].len(), 4);
}

#[test]
fn tee_junction_opens_only_the_through_beam() {
    // Stem starts on the through beam's centerline
    let beams = [
        beam(1, &[(0.0, 0.0), (100.0, 0.0)]),
        beam(2, &[(50.0, 0.0), (50.0, 100.0)]),
    ];
    let outcome = synthesizer(6.0).synthesize(&beams);

    let through = outcome.edges_of(handle(1)).unwrap();
    // Top edge is opened where the stem meets it; bottom edge stays whole
    assert_eq!(through.left.len(), 2);
    assert_eq!(through.right.len(), 1);
    assert_relative_eq!(through.right[0][0].x, 0.0);
    assert_relative_eq!(through.right[0][1].x, 100.0);

    // Stem edges start at the through beam's top edge
    let stem = outcome.edges_of(handle(2)).unwrap();
    assert_eq!(stem.left.len(), 1);
    assert_eq!(stem.right.len(), 1);
    assert_relative_eq!(stem.left[0][0].y, 6.0, epsilon = 1e-9);
    assert_relative_eq!(stem.left[0].last().unwrap().y, 100.0);

    assert_no_overlaps(&beams, 6.0);
}

#[test]
fn grid_of_beams_has_no_overlaps() {
    let beams = [
        beam(1, &[(0.0, 0.0), (200.0, 0.0)]),
        beam(2, &[(0.0, 100.0), (200.0, 100.0)]),
        beam(3, &[(0.0, -20.0), (0.0, 120.0)]),
        beam(4, &[(100.0, -20.0), (100.0, 120.0)]),
        beam(5, &[(200.0, -20.0), (200.0, 120.0)]),
    ];
    assert_no_overlaps(&beams, 5.0);

    let outcome = synthesizer(5.0).synthesize(&beams);
    // The middle column crosses both rows: three runs per side
    let middle = outcome.edges_of(handle(4)).unwrap();
    assert_eq!(middle.left.len(), 3);
    assert_eq!(middle.right.len(), 3);
}

#[test]
fn split_then_join_covers_the_same_span() {
    let curve = offset(
        &[
            Vertex::new(0.0, 0.0),
            Vertex::new(40.0, 10.0),
            Vertex::new(90.0, 15.0),
        ],
        3.0,
        Side::Right,
    )
    .unwrap();
    let joined = join(&split(&curve, &[], TOL), TOL);
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0].first(), curve.first());
    assert_eq!(joined[0].last(), curve.last());
}
