// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integrity scanning of stored handles.
//!
//! [`scan`] resolves every handle leaf under every category against the
//! document and classifies it. [`cleanup`] removes the leaves behind entries
//! that did not resolve; [`cleanup_cascading`] additionally deletes whole
//! records whose centerline is gone.

use std::fmt;

use footing_core::{DocumentStore, Handle};
use rustc_hash::FxHashSet;

use crate::category::Category;
use crate::error::Result;
use crate::record::{delete_record, CENTERLINE_KEY};
use crate::tree::{LeafValue, Node, ReferenceTree};

/// Outcome of resolving one stored handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleStatus {
    /// Resolves to a live object.
    Valid,
    /// Parses, but the object is unknown or erased.
    Missing,
    /// Text does not parse as a handle.
    Invalid,
    /// The document failed unexpectedly while resolving.
    Error,
}

impl HandleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandleStatus::Valid => "valid",
            HandleStatus::Missing => "missing",
            HandleStatus::Invalid => "invalid",
            HandleStatus::Error => "error",
        }
    }
}

impl fmt::Display for HandleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored handle and how it resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleEntry {
    pub group: Category,
    /// Interior path from the category node down to the leaf's parent.
    pub path: Vec<String>,
    /// Leaf key.
    pub key: String,
    /// Position within a handle-list leaf.
    pub index: Option<usize>,
    /// Text as stored.
    pub text: String,
    pub status: HandleStatus,
    /// Parsed handle, when the text parses.
    pub handle: Option<Handle>,
}

impl HandleEntry {
    /// True for the centerline leaf of a record.
    pub fn is_centerline(&self) -> bool {
        self.key == CENTERLINE_KEY && self.path.len() == 1
    }
}

/// Classifies stored handle text against the document.
pub fn classify<D: DocumentStore + ?Sized>(text: &str, doc: &D) -> (HandleStatus, Option<Handle>) {
    let Ok(handle) = Handle::parse(text) else {
        return (HandleStatus::Invalid, None);
    };
    let status = match doc.resolve_live(handle) {
        Ok(Some(_)) => HandleStatus::Valid,
        Ok(None) => HandleStatus::Missing,
        Err(e) => {
            tracing::warn!(%handle, error = %e, "handle lookup failed during scan");
            HandleStatus::Error
        }
    };
    (status, Some(handle))
}

/// Resolves every handle leaf under every category.
///
/// Data leaves are skipped. Entries come out per category in tree order.
pub fn scan<D: DocumentStore + ?Sized>(tree: &ReferenceTree, doc: &D) -> ScanReport {
    let mut entries = Vec::new();
    for group in Category::ALL {
        let Some(node) = tree.category_node(group) else {
            continue;
        };
        tree.for_each_leaf(node, |path, key, value| {
            let indexed = matches!(value, LeafValue::HandleList(_));
            for (i, text) in value.handle_texts().iter().enumerate() {
                let (status, handle) = classify(text, doc);
                entries.push(HandleEntry {
                    group,
                    path: path.to_vec(),
                    key: key.to_string(),
                    index: indexed.then_some(i),
                    text: text.clone(),
                    status,
                    handle,
                });
            }
        });
    }
    let report = ScanReport { entries };
    tracing::debug!(
        total = report.entries.len(),
        valid = report.count(HandleStatus::Valid),
        missing = report.count(HandleStatus::Missing),
        invalid = report.count(HandleStatus::Invalid),
        errors = report.count(HandleStatus::Error),
        "scanned reference tree"
    );
    report
}

/// Result of a [`scan`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub entries: Vec<HandleEntry>,
}

impl ScanReport {
    pub fn count(&self, status: HandleStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    /// True when every stored handle resolves.
    pub fn is_clean(&self) -> bool {
        self.entries.iter().all(|e| e.status == HandleStatus::Valid)
    }

    /// Entries that did not resolve to a live object.
    pub fn unresolved(&self) -> impl Iterator<Item = &HandleEntry> {
        self.entries.iter().filter(|e| e.status != HandleStatus::Valid)
    }
}

/// Removes the leaf behind every non-valid entry.
///
/// A list leaf goes as a whole if any item is bad. Removal is leaf-local:
/// sibling leaves and parents stay. Returns the number of leaves removed.
pub fn cleanup(tree: &mut ReferenceTree, entries: &[HandleEntry]) -> usize {
    let mut done = FxHashSet::default();
    let mut removed = 0;
    for entry in entries.iter().filter(|e| e.status != HandleStatus::Valid) {
        if !done.insert((entry.group, entry.path.clone(), entry.key.clone())) {
            continue;
        }
        if remove_leaf(tree, entry) {
            tracing::debug!(
                group = %entry.group,
                path = %entry.path.join("/"),
                key = %entry.key,
                status = %entry.status,
                "removed unresolved leaf"
            );
            removed += 1;
        }
    }
    removed
}

/// What [`cleanup_cascading`] removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub leaves_removed: usize,
    pub records_removed: usize,
    /// Live edge objects erased along with their dead centerline.
    pub objects_erased: usize,
}

/// Like [`cleanup`], but a record whose centerline is missing from the
/// document is deleted whole, erasing any of its edges still there.
///
/// [`HandleStatus::Error`] entries are left untouched, since a failed lookup
/// says nothing about whether the object still exists.
pub fn cleanup_cascading<D: DocumentStore + ?Sized>(
    tree: &mut ReferenceTree,
    doc: &mut D,
    entries: &[HandleEntry],
) -> Result<CleanupSummary> {
    let mut summary = CleanupSummary::default();
    let mut dead_records = FxHashSet::default();

    for entry in entries
        .iter()
        .filter(|e| e.status == HandleStatus::Missing && e.is_centerline())
    {
        let Some(handle) = entry.handle else {
            continue;
        };
        if tree.record_node(entry.group, handle).is_none() {
            continue;
        }
        summary.objects_erased += delete_record(tree, doc, entry.group, handle)?;
        summary.records_removed += 1;
        dead_records.insert((entry.group, entry.path[0].clone()));
    }

    let rest: Vec<HandleEntry> = entries
        .iter()
        .filter(|e| e.status != HandleStatus::Error)
        .filter(|e| {
            e.path
                .first()
                .map_or(true, |record| !dead_records.contains(&(e.group, record.clone())))
        })
        .cloned()
        .collect();
    summary.leaves_removed = cleanup(tree, &rest);
    Ok(summary)
}

/// True if any handle leaf anywhere in the tree refers to `target`.
pub fn contains_handle(tree: &ReferenceTree, target: Handle) -> bool {
    let mut found = false;
    tree.for_each_leaf(tree.root(), |_, _, value| {
        found = found || value.handle_texts().iter().any(|t| target.matches_text(t));
    });
    found
}

fn remove_leaf(tree: &mut ReferenceTree, entry: &HandleEntry) -> bool {
    let Some(group) = tree.category_node(entry.group) else {
        return false;
    };
    let Some(parent) = tree.get_from(group, &entry.path) else {
        return false;
    };
    match tree.child(parent, &entry.key).and_then(|k| tree.node(k)) {
        Some(Node::Leaf(_)) => tree.remove(parent, &entry.key),
        _ => false,
    }
}
