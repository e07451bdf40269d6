//! Beam edge synthesis.
//!
//! Given every beam's centerline, builds the left and right edges, cuts
//! each edge wherever it meets another beam's edges, and throws away the
//! pieces that fall inside another beam's band. What survives is the
//! visible outline of the beam grid: edges stop at junctions instead of
//! running through neighboring beams.
//!
//! Pipeline per run:
//!
//! 1. offset every centerline to both sides (raw edges)
//! 2. intersect each raw edge with both edges of every other beam
//! 3. split the raw edge at those points and at its own vertices
//! 4. drop pieces whose midpoint lies in another beam's band
//! 5. optionally rejoin adjacent survivors
//!
//! Steps 2–5 are independent per raw edge and run on the rayon pool.
//! Results are collected in input order, so output does not depend on
//! scheduling.

use footing_core::{Handle, Side, Vertex};
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::band::point_in_band;
use crate::config::SynthesisConfig;
use crate::error::Result;
use crate::intersect::polyline_intersections;
use crate::join::join;
use crate::offset::offset;
use crate::polyline::{midpoint, Polyline};
use crate::split::split;

/// A beam handed to the synthesizer: its centerline handle and vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamCenterline {
    pub handle: Handle,
    pub vertices: Vec<Vertex>,
}

impl BeamCenterline {
    pub fn new(handle: Handle, vertices: Vec<Vertex>) -> Self {
        Self { handle, vertices }
    }
}

/// Untrimmed left and right edges of one beam.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamBand {
    pub handle: Handle,
    pub left: Polyline,
    pub right: Polyline,
}

impl BeamBand {
    /// Offsets a centerline to both sides. `None` for degenerate centerlines.
    pub fn from_centerline(beam: &BeamCenterline, half_width: f64) -> Option<Self> {
        Some(Self {
            handle: beam.handle,
            left: offset(&beam.vertices, half_width, Side::Left)?,
            right: offset(&beam.vertices, half_width, Side::Right)?,
        })
    }

    pub fn edge(&self, side: Side) -> &[Vertex] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Returns `true` if `point` lies inside this band (boundary included).
    pub fn contains(&self, point: &nalgebra::Point2<f64>, tolerance: f64) -> bool {
        point_in_band(point, &self.left, &self.right, tolerance)
    }
}

/// Trimmed edges of one beam, grouped by side.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamEdges {
    pub handle: Handle,
    pub left: Vec<Polyline>,
    pub right: Vec<Polyline>,
}

impl BeamEdges {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            left: Vec::new(),
            right: Vec::new(),
        }
    }

    pub fn side(&self, side: Side) -> &[Polyline] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut Vec<Polyline> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Total number of edge curves on both sides.
    pub fn len(&self) -> usize {
        self.left.len() + self.right.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of one synthesis run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SynthesisOutcome {
    /// One entry per usable beam, in input order.
    pub beams: Vec<BeamEdges>,
    /// Pieces that survived trimming (before joining).
    pub kept_pieces: usize,
    /// Pieces dropped because they lay inside another beam's band.
    pub discarded_pieces: usize,
    /// Beams whose centerline could not be offset.
    pub degenerate: Vec<Handle>,
}

impl SynthesisOutcome {
    /// Trimmed edges of the beam with the given centerline handle.
    pub fn edges_of(&self, handle: Handle) -> Option<&BeamEdges> {
        self.beams.iter().find(|b| b.handle == handle)
    }
}

struct TrimmedEdge {
    beam: usize,
    side: Side,
    curves: Vec<Polyline>,
    kept: usize,
    discarded: usize,
}

/// Computes trimmed beam edges.
#[derive(Debug, Clone)]
pub struct EdgeSynthesizer {
    config: SynthesisConfig,
}

impl EdgeSynthesizer {
    /// Creates a synthesizer after validating the configuration.
    pub fn new(config: SynthesisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Offsets every centerline to both sides, skipping degenerate ones.
    ///
    /// Duplicate handles keep their first occurrence.
    pub fn raw_bands(&self, beams: &[BeamCenterline]) -> (Vec<BeamBand>, Vec<Handle>) {
        let mut seen = FxHashSet::default();
        let mut bands = Vec::with_capacity(beams.len());
        let mut degenerate = Vec::new();

        for beam in beams {
            if !seen.insert(beam.handle) {
                tracing::warn!(handle = %beam.handle, "beam listed twice; ignoring repeat");
                continue;
            }
            match BeamBand::from_centerline(beam, self.config.half_width) {
                Some(band) => bands.push(band),
                None => {
                    tracing::warn!(
                        handle = %beam.handle,
                        vertices = beam.vertices.len(),
                        "centerline is degenerate; no edges"
                    );
                    degenerate.push(beam.handle);
                }
            }
        }
        (bands, degenerate)
    }

    /// Runs the full trim pipeline over a beam set.
    ///
    /// A beam with no other band to trim against keeps its whole edges.
    pub fn synthesize(&self, beams: &[BeamCenterline]) -> SynthesisOutcome {
        let (bands, degenerate) = self.raw_bands(beams);
        if bands.is_empty() {
            tracing::debug!(beams = beams.len(), "no usable centerlines; nothing to synthesize");
            return SynthesisOutcome {
                degenerate,
                ..SynthesisOutcome::default()
            };
        }

        let jobs: Vec<(usize, Side)> = (0..bands.len())
            .flat_map(|i| Side::BOTH.into_iter().map(move |side| (i, side)))
            .collect();

        let trimmed: Vec<TrimmedEdge> = jobs
            .par_iter()
            .map(|&(beam, side)| self.trim_edge(&bands, beam, side))
            .collect();

        let mut outcome = SynthesisOutcome {
            beams: bands.iter().map(|b| BeamEdges::new(b.handle)).collect(),
            degenerate,
            ..SynthesisOutcome::default()
        };

        for edge in trimmed {
            outcome.kept_pieces += edge.kept;
            outcome.discarded_pieces += edge.discarded;
            *outcome.beams[edge.beam].side_mut(edge.side) = edge.curves;
        }

        for beam in &outcome.beams {
            tracing::debug!(
                handle = %beam.handle,
                left = beam.left.len(),
                right = beam.right.len(),
                "trimmed beam edges"
            );
        }
        outcome
    }

    /// Cuts one raw edge against every other band and keeps the outside pieces.
    fn trim_edge(&self, bands: &[BeamBand], beam: usize, side: Side) -> TrimmedEdge {
        let tolerance = self.config.tolerance;
        let edge = bands[beam].edge(side);
        let others = || {
            bands
                .iter()
                .enumerate()
                .filter(move |(i, _)| *i != beam)
                .map(|(_, b)| b)
        };

        let cuts: Vec<_> = others()
            .flat_map(|other| {
                Side::BOTH
                    .into_iter()
                    .flat_map(move |s| polyline_intersections(edge, other.edge(s)))
            })
            .collect();

        let mut kept = Vec::new();
        let mut discarded = 0;
        for piece in split(edge, &cuts, tolerance) {
            let Some(mid) = midpoint(&piece) else {
                continue;
            };
            if others().any(|other| other.contains(&mid, tolerance)) {
                discarded += 1;
            } else {
                kept.push(piece);
            }
        }

        let kept_count = kept.len();
        let curves = if self.config.join_segments {
            join(&kept, tolerance)
        } else {
            kept
        };

        TrimmedEdge {
            beam,
            side,
            curves,
            kept: kept_count,
            discarded,
        }
    }
}
