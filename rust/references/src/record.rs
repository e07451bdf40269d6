// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-beam records.
//!
//! A record lives at `ROOT_KEY / <category> / <centerline handle>` and holds
//! the `centerline` leaf, an `edges` subtree of `LEFT_<i>` / `RIGHT_<i>`
//! leaves, and an opaque `metadata` leaf.

use footing_core::{DocumentStore, Handle, Side};

use crate::category::Category;
use crate::error::{Error, Result};
use crate::keys::NodeKey;
use crate::tree::{resolve, LeafValue, ReferenceTree};

pub const CENTERLINE_KEY: &str = "centerline";
pub const EDGES_KEY: &str = "edges";
pub const METADATA_KEY: &str = "metadata";

/// Decoded view of one record.
///
/// Edge lists are ordered by their numeric suffix; entries whose text does
/// not parse as a handle are left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeamRecord {
    pub category: Category,
    pub centerline: Handle,
    pub left: Vec<Handle>,
    pub right: Vec<Handle>,
    pub metadata: Option<String>,
}

impl BeamRecord {
    pub fn edges(&self, side: Side) -> &[Handle] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// All edge handles, left side first.
    pub fn edge_handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.left.iter().chain(self.right.iter()).copied()
    }
}

impl ReferenceTree {
    /// Record node of a centerline, matching keys written in any handle case.
    pub fn record_node(&self, category: Category, handle: Handle) -> Option<NodeKey> {
        let group = self.category_node(category)?;
        self.child(group, &handle.to_text()).or_else(|| {
            self.enumerate(group)
                .into_iter()
                .find(|(name, _)| handle.matches_text(name))
                .map(|(_, key)| key)
        })
    }

    /// Creates the record for `handle` if needed: centerline leaf, empty
    /// edges subtree and empty metadata.
    pub fn ensure_record(&mut self, category: Category, handle: Handle) -> Result<NodeKey> {
        if let Some(node) = self.record_node(category, handle) {
            return Ok(node);
        }
        let group = self.ensure_category(category)?;
        self.ensure_record_raw(group, &handle.to_text(), LeafValue::from(handle))
    }

    /// Creates a record under `group` from raw key and centerline text.
    pub(crate) fn ensure_record_raw(
        &mut self,
        group: NodeKey,
        key: &str,
        centerline: LeafValue,
    ) -> Result<NodeKey> {
        let node = self.get_or_create_child(group, key)?;
        self.set_leaf(node, CENTERLINE_KEY, centerline)?;
        self.get_or_create_child(node, EDGES_KEY)?;
        if self.leaf(node, METADATA_KEY).is_none() {
            self.set_leaf(node, METADATA_KEY, LeafValue::Data(String::new()))?;
        }
        Ok(node)
    }

    /// Replaces the edge lists of an existing record.
    pub fn write_edges(
        &mut self,
        category: Category,
        handle: Handle,
        left: &[Handle],
        right: &[Handle],
    ) -> Result<()> {
        let node = self
            .record_node(category, handle)
            .ok_or(Error::RecordNotFound { category, handle })?;
        let edges = self.get_or_create_child(node, EDGES_KEY)?;
        self.clear(edges);
        for (side, handles) in [(Side::Left, left), (Side::Right, right)] {
            for (i, edge) in handles.iter().enumerate() {
                self.set_leaf(edges, &side.edge_key(i), LeafValue::from(*edge))?;
            }
        }
        Ok(())
    }

    /// Stores opaque metadata on an existing record.
    pub fn write_metadata(&mut self, category: Category, handle: Handle, data: &str) -> Result<()> {
        let node = self
            .record_node(category, handle)
            .ok_or(Error::RecordNotFound { category, handle })?;
        self.set_leaf(node, METADATA_KEY, LeafValue::Data(data.to_string()))
    }

    /// Decodes the record of `handle`, if present.
    pub fn load_record(&self, category: Category, handle: Handle) -> Option<BeamRecord> {
        let node = self.record_node(category, handle)?;
        self.decode_record(category, node)
    }

    /// Decodes every record of a category whose centerline text parses.
    pub fn records(&self, category: Category) -> Vec<BeamRecord> {
        let Some(group) = self.category_node(category) else {
            return Vec::new();
        };
        self.enumerate(group)
            .into_iter()
            .filter_map(|(_, node)| self.decode_record(category, node))
            .collect()
    }

    /// Centerline handles of a category, in key order.
    pub fn record_handles(&self, category: Category) -> Vec<Handle> {
        self.records(category).into_iter().map(|r| r.centerline).collect()
    }

    /// Raw edge leaves of a record as `(side, index, text)`, ordered by side
    /// then numeric index.
    pub fn edge_entries(&self, record: NodeKey) -> Vec<(Side, usize, String)> {
        let Some(edges) = self.child(record, EDGES_KEY) else {
            return Vec::new();
        };
        let mut entries: Vec<_> = self
            .enumerate(edges)
            .into_iter()
            .filter_map(|(key, _)| {
                let (side, index) = Side::parse_edge_key(key)?;
                match self.leaf(edges, key)? {
                    LeafValue::Handle(text) => Some((side, index, text.clone())),
                    _ => None,
                }
            })
            .collect();
        entries.sort_by_key(|(side, index, _)| (*side != Side::Left, *index));
        entries
    }

    fn decode_record(&self, category: Category, node: NodeKey) -> Option<BeamRecord> {
        let centerline = match self.leaf(node, CENTERLINE_KEY)? {
            LeafValue::Handle(text) => Handle::parse(text).ok()?,
            _ => return None,
        };
        let mut record = BeamRecord {
            category,
            centerline,
            left: Vec::new(),
            right: Vec::new(),
            metadata: match self.leaf(node, METADATA_KEY) {
                Some(LeafValue::Data(data)) if !data.is_empty() => Some(data.clone()),
                _ => None,
            },
        };
        for (side, _, text) in self.edge_entries(node) {
            if let Ok(handle) = Handle::parse(&text) {
                match side {
                    Side::Left => record.left.push(handle),
                    Side::Right => record.right.push(handle),
                }
            }
        }
        Some(record)
    }
}

/// Erases a record's objects and removes the record subtree.
///
/// Edges go first, then the centerline. Entries that no longer resolve to a
/// live object are skipped. Returns the number of objects erased.
pub fn delete_record<D: DocumentStore + ?Sized>(
    tree: &mut ReferenceTree,
    doc: &mut D,
    category: Category,
    handle: Handle,
) -> Result<usize> {
    let node = tree
        .record_node(category, handle)
        .ok_or(Error::RecordNotFound { category, handle })?;

    let mut texts: Vec<String> = tree
        .edge_entries(node)
        .into_iter()
        .map(|(_, _, text)| text)
        .collect();
    if let Some(LeafValue::Handle(text)) = tree.leaf(node, CENTERLINE_KEY) {
        texts.push(text.clone());
    }

    let mut erased = 0;
    for text in &texts {
        if let Some(object) = resolve(text, &*doc) {
            doc.erase_object(object.handle)?;
            erased += 1;
        }
    }

    if let Some(group) = tree.category_node(category) {
        let key = tree
            .enumerate(group)
            .into_iter()
            .find(|(_, k)| *k == node)
            .map(|(name, _)| name.to_string());
        if let Some(key) = key {
            tree.remove(group, &key);
        }
    }
    tracing::debug!(%category, %handle, erased, "deleted beam record");
    Ok(erased)
}
