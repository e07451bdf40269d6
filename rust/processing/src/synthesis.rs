// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Edge rebuild over a beam set.
//!
//! One run purges the stored edges of every listed beam, reads the live
//! centerlines, trims fresh edges with the [`EdgeSynthesizer`], writes them
//! to the document and records their handles. The whole run is one batch.

use footing_core::{DocumentStore, Handle};
use footing_geometry::{BeamCenterline, EdgeSynthesizer, Polyline};
use footing_references::{resolve, Category, ReferenceTree};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::manager::BeamRecordManager;

/// What one rebuild did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisReport {
    /// Beams listed by the caller.
    pub beams: usize,
    /// Previous edge objects erased.
    pub purged: usize,
    /// Edge objects created.
    pub created: usize,
    /// Pieces kept after trimming, before joining.
    pub kept_pieces: usize,
    /// Pieces dropped inside another beam's band.
    pub discarded_pieces: usize,
    /// Beams whose centerline no longer resolves; skipped, not deleted.
    pub stale: Vec<Handle>,
    /// Beams whose centerline is too short to offset.
    pub degenerate: Vec<Handle>,
}

impl<'a, D: DocumentStore> BeamRecordManager<'a, D> {
    /// Rebuilds the edges of `beams`, replacing whatever was stored before.
    ///
    /// Purging always runs. With fewer than two beams nothing is created.
    /// Beams without a record are registered on the way.
    pub fn rebuild_edges(&mut self, beams: &[Handle]) -> Result<SynthesisReport> {
        let synthesizer = EdgeSynthesizer::new(self.config.synthesis)?;
        let category = self.config.category;
        let layer = self.config.edge_layer.clone();

        let report = self.transact(|doc, tree| {
            let mut report = SynthesisReport {
                beams: beams.len(),
                ..SynthesisReport::default()
            };
            report.purged = purge(doc, tree, category, beams)?;

            if beams.len() < 2 {
                tracing::info!(
                    beams = beams.len(),
                    purged = report.purged,
                    "fewer than two beams; no edges created"
                );
                return Ok(report);
            }

            let mut centerlines = Vec::with_capacity(beams.len());
            for &beam in beams {
                match read_centerline(&*doc, beam) {
                    Some(vertices) => centerlines.push(BeamCenterline::new(beam, vertices)),
                    None => {
                        tracing::warn!(%beam, "centerline does not resolve; beam skipped");
                        report.stale.push(beam);
                    }
                }
            }

            let outcome = synthesizer.synthesize(&centerlines);
            report.kept_pieces = outcome.kept_pieces;
            report.discarded_pieces = outcome.discarded_pieces;
            report.degenerate = outcome.degenerate.clone();

            for edges in &outcome.beams {
                let left = create_all(doc, &edges.left, &layer)?;
                let right = create_all(doc, &edges.right, &layer)?;
                report.created += left.len() + right.len();

                tree.ensure_record(category, edges.handle)?;
                tree.write_edges(category, edges.handle, &left, &right)?;
                tracing::debug!(
                    beam = %edges.handle,
                    left = left.len(),
                    right = right.len(),
                    "stored beam edges"
                );
            }
            Ok(report)
        })?;

        tracing::info!(
            beams = report.beams,
            purged = report.purged,
            created = report.created,
            kept = report.kept_pieces,
            discarded = report.discarded_pieces,
            stale = report.stale.len(),
            degenerate = report.degenerate.len(),
            "rebuilt beam edges"
        );
        Ok(report)
    }
}

/// Erases the stored edge objects of `beams` and empties their edge lists.
fn purge<D: DocumentStore>(
    doc: &mut D,
    tree: &mut ReferenceTree,
    category: Category,
    beams: &[Handle],
) -> Result<usize> {
    let mut erased = 0;
    for &beam in beams {
        let Some(record) = tree.record_node(category, beam) else {
            continue;
        };
        for (_, _, text) in tree.edge_entries(record) {
            if let Some(object) = resolve(&text, &*doc) {
                doc.erase_object(object.handle)?;
                erased += 1;
            }
        }
        tree.write_edges(category, beam, &[], &[])?;
    }
    Ok(erased)
}

fn read_centerline<D: DocumentStore>(doc: &D, beam: Handle) -> Option<Vec<footing_core::Vertex>> {
    resolve(&beam.to_text(), doc)?;
    doc.read_geometry(beam)
}

fn create_all<D: DocumentStore>(doc: &mut D, curves: &[Polyline], layer: &str) -> Result<Vec<Handle>> {
    curves
        .iter()
        .map(|curve| Ok(doc.create_object(curve, layer)?))
        .collect()
}
