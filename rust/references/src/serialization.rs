// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON persistence of the reference tree.
//!
//! The persisted layout is keyed by category, then by centerline handle:
//!
//! ```json
//! {
//!   "grade-beam": {
//!     "1A2": {
//!       "centerline": "1A2",
//!       "edges": { "LEFT_0": "1B0", "RIGHT_0": "1B1" },
//!       "metadata": "{\"mark\":\"GB-1\"}"
//!     }
//!   }
//! }
//! ```
//!
//! Handle text is carried verbatim, malformed or not. On import, unknown
//! categories and unknown record fields are dropped with a warning; a record
//! without a centerline fails the whole import.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::{Error, Result};
use crate::record::{CENTERLINE_KEY, EDGES_KEY, METADATA_KEY};
use crate::tree::{LeafValue, Node, ReferenceTree};

/// Serializable form of one record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordLayout {
    pub centerline: String,
    #[serde(default)]
    pub edges: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    /// Fields this version does not know; dropped on import.
    #[serde(flatten)]
    pub unknown: BTreeMap<String, serde_json::Value>,
}

/// Serializable form of the whole tree: category key, then record key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeLayout(pub BTreeMap<String, BTreeMap<String, RecordLayout>>);

impl ReferenceTree {
    /// Serialize the tree to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_layout())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a tree from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let layout: TreeLayout =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        Self::from_layout(&layout)
    }

    /// Builds the persisted layout. Every known category is present, even
    /// when empty.
    pub fn to_layout(&self) -> TreeLayout {
        let mut layout = BTreeMap::new();
        for category in Category::ALL {
            let Some(group) = self.category_node(category) else {
                continue;
            };
            let mut records = BTreeMap::new();
            for (key, node) in self.enumerate(group) {
                match self.record_layout(node) {
                    Some(record) => {
                        records.insert(key.to_string(), record);
                    }
                    None => {
                        tracing::warn!(%category, key, "entry is not a beam record; not persisted");
                    }
                }
            }
            layout.insert(category.as_str().to_string(), records);
        }
        TreeLayout(layout)
    }

    /// Rebuilds a tree from its persisted layout.
    pub fn from_layout(layout: &TreeLayout) -> Result<Self> {
        let mut tree = Self::new();
        for (name, records) in &layout.0 {
            let Some(category) = Category::from_key(name) else {
                tracing::warn!(category = %name, records = records.len(), "unknown category dropped on import");
                continue;
            };
            let group = tree.ensure_category(category)?;
            for (key, record) in records {
                for field in record.unknown.keys() {
                    tracing::warn!(%category, record = %key, field = %field, "unknown record field dropped on import");
                }
                let node =
                    tree.ensure_record_raw(group, key, LeafValue::Handle(record.centerline.clone()))?;
                let edges = tree.get_or_create_child(node, EDGES_KEY)?;
                for (edge_key, text) in &record.edges {
                    tree.set_leaf(edges, edge_key, LeafValue::Handle(text.clone()))?;
                }
                if let Some(metadata) = &record.metadata {
                    tree.set_leaf(node, METADATA_KEY, LeafValue::Data(metadata.clone()))?;
                }
            }
        }
        Ok(tree)
    }

    fn record_layout(&self, node: crate::NodeKey) -> Option<RecordLayout> {
        let centerline = match self.leaf(node, CENTERLINE_KEY)? {
            LeafValue::Handle(text) => text.clone(),
            _ => return None,
        };
        let mut edges = BTreeMap::new();
        if let Some(edges_node) = self.child(node, EDGES_KEY) {
            for (key, child) in self.enumerate(edges_node) {
                match self.node(child) {
                    Some(Node::Leaf(LeafValue::Handle(text))) => {
                        edges.insert(key.to_string(), text.clone());
                    }
                    _ => tracing::warn!(key, "edge entry is not a single handle; not persisted"),
                }
            }
        }
        let metadata = match self.leaf(node, METADATA_KEY) {
            Some(LeafValue::Data(data)) if !data.is_empty() => Some(data.clone()),
            _ => None,
        };
        Some(RecordLayout {
            centerline,
            edges,
            metadata,
            unknown: BTreeMap::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use footing_core::Handle;

    fn h(v: u64) -> Handle {
        Handle::new(v).unwrap()
    }

    #[test]
    fn roundtrip_empty_tree() {
        let tree = ReferenceTree::new();
        let json = tree.to_json().unwrap();
        let restored = ReferenceTree::from_json(&json).unwrap();
        assert_eq!(tree, restored);
        assert_eq!(restored.to_layout().0.len(), Category::ALL.len());
    }

    #[test]
    fn roundtrip_records_with_edges_and_metadata() {
        let mut tree = ReferenceTree::new();
        tree.ensure_record(Category::GradeBeam, h(0x1A2)).unwrap();
        tree.write_edges(Category::GradeBeam, h(0x1A2), &[h(0x1B0), h(0x1B2)], &[h(0x1B1)])
            .unwrap();
        tree.write_metadata(Category::GradeBeam, h(0x1A2), "{\"mark\":\"GB-1\"}")
            .unwrap();
        tree.ensure_record(Category::Boundary, h(0x20)).unwrap();

        let json = tree.to_json().unwrap();
        let restored = ReferenceTree::from_json(&json).unwrap();
        assert_eq!(tree, restored);
        assert_eq!(
            restored.load_record(Category::GradeBeam, h(0x1A2)),
            tree.load_record(Category::GradeBeam, h(0x1A2))
        );
    }

    #[test]
    fn malformed_text_survives_roundtrip() {
        let json = r#"{ "rebar": { "1A2": { "centerline": "1A2", "edges": { "LEFT_0": "garbage" } } } }"#;
        let tree = ReferenceTree::from_json(json).unwrap();
        let again = ReferenceTree::from_json(&tree.to_json().unwrap()).unwrap();
        assert_eq!(tree, again);

        let record = again.record_node(Category::Rebar, h(0x1A2)).unwrap();
        let edges = again.child(record, EDGES_KEY).unwrap();
        assert_eq!(
            again.leaf(edges, "LEFT_0"),
            Some(&LeafValue::Handle("garbage".into()))
        );
    }

    #[test]
    fn unknown_categories_and_fields_are_dropped() {
        let json = r#"{
            "grade-beam": { "1A2": { "centerline": "1A2", "color": 3 } },
            "footings": { "99": { "centerline": "99" } }
        }"#;
        let tree = ReferenceTree::from_json(json).unwrap();
        let layout = tree.to_layout();
        assert!(!layout.0.contains_key("footings"));
        let record = &layout.0["grade-beam"]["1A2"];
        assert!(record.unknown.is_empty());
        assert!(!tree.to_json().unwrap().contains("color"));
    }

    #[test]
    fn missing_centerline_fails_import() {
        let json = r#"{ "grade-beam": { "1A2": { "edges": {} } } }"#;
        assert!(matches!(
            ReferenceTree::from_json(json),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn garbage_json_fails_import() {
        assert!(matches!(
            ReferenceTree::from_json("not json"),
            Err(Error::Serialization(_))
        ));
    }
}
