// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Façade over a document and its reference tree.
//!
//! Every mutation runs inside one [`DocumentStore::run_atomic`] batch. The
//! tree is snapshotted first and put back if the batch fails, so a failed
//! operation leaves neither store changed.

use footing_core::{DocumentStore, Handle, Side};
use footing_references::{
    cleanup, cleanup_cascading, contains_handle, resolve, scan, BeamRecord, Category,
    CleanupSummary, LeafValue, ReferenceTree, ScanReport, CENTERLINE_KEY,
};

use crate::config::DetailingConfig;
use crate::context::DocumentContext;
use crate::error::{Error, Result};

/// Part a drawing object plays in a beam record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Centerline,
    Edge { side: Side, index: usize },
}

impl Role {
    pub fn is_edge(&self) -> bool {
        matches!(self, Role::Edge { .. })
    }
}

/// Record that owns a drawing object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    pub category: Category,
    pub beam: Handle,
    pub role: Role,
}

/// Creates, reads and deletes beam records for one document.
pub struct BeamRecordManager<'a, D: DocumentStore> {
    pub(crate) context: &'a mut DocumentContext,
    pub(crate) doc: &'a mut D,
    pub(crate) config: DetailingConfig,
}

impl<'a, D: DocumentStore> BeamRecordManager<'a, D> {
    pub fn new(context: &'a mut DocumentContext, doc: &'a mut D, config: DetailingConfig) -> Self {
        Self {
            context,
            doc,
            config,
        }
    }

    pub fn config(&self) -> &DetailingConfig {
        &self.config
    }

    pub fn category(&self) -> Category {
        self.config.category
    }

    pub fn tree(&self) -> &ReferenceTree {
        self.context.tree()
    }

    pub fn document(&self) -> &D {
        &*self.doc
    }

    /// Creates the record of a live centerline, or returns the existing one.
    ///
    /// Fails with [`Error::AlreadyRegistered`] if the handle is already
    /// stored anywhere else in the tree.
    pub fn register_centerline(&mut self, handle: Handle) -> Result<BeamRecord> {
        let category = self.category();
        if let Some(record) = self.tree().load_record(category, handle) {
            return Ok(record);
        }
        if contains_handle(self.tree(), handle) {
            return Err(Error::AlreadyRegistered(handle));
        }
        if self.doc.resolve_live(handle)?.is_none() {
            return Err(footing_core::Error::ObjectNotFound(handle).into());
        }

        self.transact(|_, tree| {
            tree.ensure_record(category, handle)?;
            Ok(())
        })?;
        tracing::debug!(%category, %handle, "registered centerline");
        self.load(handle).ok_or(Error::RecordNotFound(handle))
    }

    /// Replaces the edge lists of a registered beam.
    pub fn store_edges(&mut self, handle: Handle, left: &[Handle], right: &[Handle]) -> Result<()> {
        let category = self.require_record(handle)?;
        self.transact(|_, tree| {
            tree.write_edges(category, handle, left, right)?;
            Ok(())
        })
    }

    /// Record view of a registered beam.
    pub fn load(&self, handle: Handle) -> Option<BeamRecord> {
        self.tree().load_record(self.category(), handle)
    }

    /// Every record of the configured category, in key order.
    pub fn records(&self) -> Vec<BeamRecord> {
        self.tree().records(self.category())
    }

    /// Finds the record that stores `object`, as centerline or as an edge.
    ///
    /// Looks through every category.
    pub fn resolve_owner(&self, object: Handle) -> Option<Owner> {
        let tree = self.tree();
        for category in Category::ALL {
            let Some(group) = tree.category_node(category) else {
                continue;
            };
            for (_, record) in tree.enumerate(group) {
                let Some(LeafValue::Handle(text)) = tree.leaf(record, CENTERLINE_KEY) else {
                    continue;
                };
                let Ok(beam) = Handle::parse(text) else {
                    continue;
                };
                if beam == object {
                    return Some(Owner {
                        category,
                        beam,
                        role: Role::Centerline,
                    });
                }
                let edge = tree
                    .edge_entries(record)
                    .into_iter()
                    .find(|(_, _, text)| object.matches_text(text));
                if let Some((side, index, _)) = edge {
                    return Some(Owner {
                        category,
                        beam,
                        role: Role::Edge { side, index },
                    });
                }
            }
        }
        None
    }

    /// Erases a beam's edge objects and centerline, then drops its record.
    ///
    /// Returns the number of objects erased.
    pub fn delete_record(&mut self, handle: Handle) -> Result<usize> {
        let category = self.require_record(handle)?;
        let erased = self.transact(|doc, tree| {
            Ok(footing_references::delete_record(tree, doc, category, handle)?)
        })?;
        tracing::info!(%category, %handle, erased, "deleted beam record");
        Ok(erased)
    }

    /// Stores an opaque metadata blob on a registered beam.
    pub fn set_metadata(&mut self, handle: Handle, data: &str) -> Result<()> {
        let category = self.require_record(handle)?;
        self.transact(|_, tree| {
            tree.write_metadata(category, handle, data)?;
            Ok(())
        })
    }

    pub fn metadata(&self, handle: Handle) -> Option<String> {
        self.load(handle)?.metadata
    }

    /// Classifies every stored handle against the document.
    pub fn scan(&mut self) -> ScanReport {
        let report = scan(self.context.tree(), &*self.doc);
        self.context.mark_scanned();
        report
    }

    /// Removes the leaves behind unresolved entries, one leaf at a time.
    pub fn cleanup(&mut self, report: &ScanReport) -> Result<usize> {
        let removed = self.transact(|_, tree| Ok(cleanup(tree, &report.entries)))?;
        tracing::info!(removed, "cleaned up unresolved references");
        Ok(removed)
    }

    /// Like [`Self::cleanup`], but records whose centerline is gone are
    /// deleted whole.
    pub fn cleanup_cascading(&mut self, report: &ScanReport) -> Result<CleanupSummary> {
        let summary =
            self.transact(|doc, tree| Ok(cleanup_cascading(tree, doc, &report.entries)?))?;
        tracing::info!(
            leaves = summary.leaves_removed,
            records = summary.records_removed,
            erased = summary.objects_erased,
            "cleaned up unresolved references"
        );
        Ok(summary)
    }

    /// True when `handle` resolves to a live object in the document.
    pub fn is_live(&self, handle: Handle) -> bool {
        resolve(&handle.to_text(), &*self.doc).is_some()
    }

    fn require_record(&self, handle: Handle) -> Result<Category> {
        let category = self.category();
        self.tree()
            .record_node(category, handle)
            .map(|_| category)
            .ok_or(Error::RecordNotFound(handle))
    }

    /// Runs `f` as one batch over the document and the tree.
    pub(crate) fn transact<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut D, &mut ReferenceTree) -> Result<T>,
    {
        let snapshot = self.context.tree().clone();
        let tree = self.context.tree_mut();
        let result = self.doc.run_atomic(|doc| f(doc, tree));
        if let Err(e) = &result {
            tracing::warn!(document = %self.context.id(), error = %e, "batch failed; reference tree restored");
            *self.context.tree_mut() = snapshot;
        }
        result
    }
}
