// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hierarchical key/value store persisted alongside the drawing.
//!
//! The [`ReferenceTree`] owns every node in a slot map. Interior nodes map
//! child names to keys in sorted order; leaves hold weak handle text or
//! opaque data. Handles are stored as text and never kept alive by the
//! tree: resolving one against the document may find nothing.
//!
//! ```text
//! (root)
//! └── FOUNDATION_REFERENCES
//!     ├── boundary
//!     ├── grade-beam
//!     │   └── 1A2
//!     │       ├── centerline = "1A2"
//!     │       ├── edges
//!     │       │   ├── LEFT_0 = "1B0"
//!     │       │   └── RIGHT_0 = "1B1"
//!     │       └── metadata
//!     ├── beam-strand
//!     ├── slab-strand
//!     └── rebar
//! ```

use std::collections::BTreeMap;

use footing_core::{DocumentObject, DocumentStore, Handle};
use slotmap::SlotMap;

use crate::category::{Category, ROOT_KEY};
use crate::error::{Error, Result};
use crate::keys::NodeKey;

/// Value stored at a leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafValue {
    /// A single weak handle, as text.
    Handle(String),
    /// Several weak handles, as text.
    HandleList(Vec<String>),
    /// Opaque data. Never treated as a handle.
    Data(String),
}

impl LeafValue {
    /// Handle texts carried by this leaf. Empty for data leaves.
    pub fn handle_texts(&self) -> &[String] {
        match self {
            LeafValue::Handle(text) => std::slice::from_ref(text),
            LeafValue::HandleList(texts) => texts,
            LeafValue::Data(_) => &[],
        }
    }
}

impl From<Handle> for LeafValue {
    fn from(handle: Handle) -> Self {
        LeafValue::Handle(handle.to_text())
    }
}

/// A node of the tree.
#[derive(Debug, Clone)]
pub enum Node {
    Interior(BTreeMap<String, NodeKey>),
    Leaf(LeafValue),
}

/// Arena-backed tree of named nodes.
///
/// A fresh tree already holds [`ROOT_KEY`] and one interior node per
/// [`Category`].
#[derive(Debug, Clone)]
pub struct ReferenceTree {
    nodes: SlotMap<NodeKey, Node>,
    root: NodeKey,
}

impl Default for ReferenceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceTree {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::Interior(BTreeMap::new()));
        let mut tree = Self { nodes, root };
        for category in Category::ALL {
            tree.insert_interior_path(&[ROOT_KEY, category.as_str()]);
        }
        tree
    }

    /// Key of the unnamed root dictionary.
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Number of live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn is_interior(&self, key: NodeKey) -> bool {
        matches!(self.nodes.get(key), Some(Node::Interior(_)))
    }

    /// Node of a category, `None` if it was removed.
    pub fn category_node(&self, category: Category) -> Option<NodeKey> {
        self.get(&[ROOT_KEY, category.as_str()])
    }

    /// Category node, recreated if missing.
    pub fn ensure_category(&mut self, category: Category) -> Result<NodeKey> {
        self.get_or_create(&[ROOT_KEY, category.as_str()])
    }

    /// Child of an interior node by name.
    pub fn child(&self, parent: NodeKey, name: &str) -> Option<NodeKey> {
        match self.nodes.get(parent)? {
            Node::Interior(children) => children.get(name).copied(),
            Node::Leaf(_) => None,
        }
    }

    /// Follows `path` from the root. Returns `None` if any segment is absent.
    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<NodeKey> {
        self.get_from(self.root, path)
    }

    /// Follows `path` from `start`.
    pub fn get_from<S: AsRef<str>>(&self, start: NodeKey, path: &[S]) -> Option<NodeKey> {
        path.iter()
            .try_fold(start, |node, segment| self.child(node, segment.as_ref()))
    }

    /// Follows `path` from the root, creating missing interior nodes.
    ///
    /// Fails with [`Error::NotInterior`] if a segment names an existing leaf.
    pub fn get_or_create<S: AsRef<str>>(&mut self, path: &[S]) -> Result<NodeKey> {
        let mut node = self.root;
        for segment in path {
            node = self.get_or_create_child(node, segment.as_ref())?;
        }
        Ok(node)
    }

    /// Interior child of `parent`, created if absent.
    pub fn get_or_create_child(&mut self, parent: NodeKey, name: &str) -> Result<NodeKey> {
        if let Some(existing) = self.child(parent, name) {
            return match self.nodes.get(existing) {
                Some(Node::Interior(_)) => Ok(existing),
                _ => Err(Error::NotInterior(name.to_string())),
            };
        }
        let child = self.nodes.insert(Node::Interior(BTreeMap::new()));
        self.children_mut(parent)?.insert(name.to_string(), child);
        Ok(child)
    }

    /// Writes a leaf under `parent`, replacing any leaf already stored there.
    ///
    /// Refuses to overwrite a subtree.
    pub fn set_leaf(&mut self, parent: NodeKey, key: &str, value: LeafValue) -> Result<()> {
        if let Some(existing) = self.child(parent, key) {
            return match self.nodes.get_mut(existing) {
                Some(Node::Leaf(slot)) => {
                    *slot = value;
                    Ok(())
                }
                _ => Err(Error::NotALeaf(key.to_string())),
            };
        }
        let leaf = self.nodes.insert(Node::Leaf(value));
        match self.children_mut(parent) {
            Ok(children) => {
                children.insert(key.to_string(), leaf);
                Ok(())
            }
            Err(e) => {
                self.nodes.remove(leaf);
                Err(e)
            }
        }
    }

    /// Value of the leaf `key` under `parent`.
    pub fn leaf(&self, parent: NodeKey, key: &str) -> Option<&LeafValue> {
        match self.nodes.get(self.child(parent, key)?)? {
            Node::Leaf(value) => Some(value),
            Node::Interior(_) => None,
        }
    }

    /// Children of an interior node in key order. Empty for leaves and
    /// unknown keys.
    pub fn enumerate(&self, node: NodeKey) -> Vec<(&str, NodeKey)> {
        match self.nodes.get(node) {
            Some(Node::Interior(children)) => children
                .iter()
                .map(|(name, key)| (name.as_str(), *key))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Removes the child `key` of `parent` together with its subtree.
    ///
    /// Returns `false` if there was nothing to remove.
    pub fn remove(&mut self, parent: NodeKey, key: &str) -> bool {
        let Some(Node::Interior(children)) = self.nodes.get_mut(parent) else {
            return false;
        };
        let Some(child) = children.remove(key) else {
            return false;
        };
        self.free_subtree(child);
        true
    }

    /// Removes every child of an interior node.
    pub fn clear(&mut self, node: NodeKey) {
        let Some(Node::Interior(children)) = self.nodes.get_mut(node) else {
            return;
        };
        for child in std::mem::take(children).into_values().collect::<Vec<_>>() {
            self.free_subtree(child);
        }
    }

    /// Visits every leaf below `start` with its path relative to `start`.
    pub fn for_each_leaf<F>(&self, start: NodeKey, mut visit: F)
    where
        F: FnMut(&[String], &str, &LeafValue),
    {
        let mut path = Vec::new();
        self.walk_leaves(start, &mut path, &mut visit);
    }

    fn walk_leaves<F>(&self, node: NodeKey, path: &mut Vec<String>, visit: &mut F)
    where
        F: FnMut(&[String], &str, &LeafValue),
    {
        let Some(Node::Interior(children)) = self.nodes.get(node) else {
            return;
        };
        for (name, child) in children {
            match self.nodes.get(*child) {
                Some(Node::Leaf(value)) => visit(path, name, value),
                Some(Node::Interior(_)) => {
                    path.push(name.clone());
                    self.walk_leaves(*child, path, visit);
                    path.pop();
                }
                None => {}
            }
        }
    }

    fn children_mut(&mut self, node: NodeKey) -> Result<&mut BTreeMap<String, NodeKey>> {
        match self.nodes.get_mut(node) {
            Some(Node::Interior(children)) => Ok(children),
            Some(Node::Leaf(_)) => Err(Error::NotInterior(format!("{node:?}"))),
            None => Err(Error::NodeNotFound),
        }
    }

    fn free_subtree(&mut self, key: NodeKey) {
        let mut stack = vec![key];
        while let Some(key) = stack.pop() {
            if let Some(Node::Interior(children)) = self.nodes.remove(key) {
                stack.extend(children.into_values());
            }
        }
    }

    fn insert_interior_path(&mut self, path: &[&str]) {
        let mut node = self.root;
        for segment in path {
            let next = self.child(node, segment).unwrap_or_else(|| {
                let child = self.nodes.insert(Node::Interior(BTreeMap::new()));
                if let Some(Node::Interior(children)) = self.nodes.get_mut(node) {
                    children.insert((*segment).to_string(), child);
                }
                child
            });
            node = next;
        }
    }

    fn subtree_eq(&self, a: NodeKey, other: &Self, b: NodeKey) -> bool {
        match (self.nodes.get(a), other.nodes.get(b)) {
            (Some(Node::Leaf(x)), Some(Node::Leaf(y))) => x == y,
            (Some(Node::Interior(x)), Some(Node::Interior(y))) => {
                x.len() == y.len()
                    && x.iter().zip(y.iter()).all(|((ka, ca), (kb, cb))| {
                        ka == kb && self.subtree_eq(*ca, other, *cb)
                    })
            }
            _ => false,
        }
    }
}

/// Trees are equal when they hold the same names and values, whatever
/// their arena layout.
impl PartialEq for ReferenceTree {
    fn eq(&self, other: &Self) -> bool {
        self.subtree_eq(self.root, other, other.root)
    }
}

/// Resolves stored handle text to a live document object.
///
/// Malformed text, unknown or erased objects, and lookup failures all come
/// back as `None`; lookup failures are logged and never propagated.
pub fn resolve<D: DocumentStore + ?Sized>(text: &str, doc: &D) -> Option<DocumentObject> {
    let handle = match Handle::parse(text) {
        Ok(handle) => handle,
        Err(e) => {
            tracing::debug!(text, error = %e, "unparseable handle text");
            return None;
        }
    };
    match doc.resolve_live(handle) {
        Ok(object) => object,
        Err(e) => {
            tracing::warn!(%handle, error = %e, "handle lookup failed; treating as unresolved");
            None
        }
    }
}
