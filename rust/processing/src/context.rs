// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-document state.
//!
//! Each open drawing gets a [`DocumentContext`] holding its reference tree,
//! the cached boundary-beam handle and its event subscription. Contexts live
//! in a [`ContextRegistry`] keyed by [`DocumentId`] and are passed
//! explicitly to every operation.

use std::fmt;

use footing_core::{DocumentEvent, DocumentStore, Handle};
use footing_references::{contains_handle, ReferenceTree};
use rustc_hash::{FxHashMap, FxHashSet};

/// Identity of an open document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// State kept for one document between operations.
#[derive(Debug, Clone)]
pub struct DocumentContext {
    id: DocumentId,
    tree: ReferenceTree,
    boundary: Option<Handle>,
    attached: bool,
    erased_owned: FxHashSet<Handle>,
}

impl DocumentContext {
    pub fn new(id: DocumentId) -> Self {
        Self::with_tree(id, ReferenceTree::new())
    }

    /// Context over a tree loaded from the document.
    pub fn with_tree(id: DocumentId, tree: ReferenceTree) -> Self {
        Self {
            id,
            tree,
            boundary: None,
            attached: false,
            erased_owned: FxHashSet::default(),
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn tree(&self) -> &ReferenceTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ReferenceTree {
        &mut self.tree
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Subscribes to document events. Detaches first, so attaching twice
    /// never delivers an event twice.
    pub fn attach(&mut self) {
        self.detach();
        self.attached = true;
        tracing::debug!(document = %self.id, "attached to document events");
    }

    pub fn detach(&mut self) {
        if self.attached {
            self.attached = false;
            tracing::debug!(document = %self.id, "detached from document events");
        }
    }

    /// Cached boundary-beam handle.
    pub fn boundary(&self) -> Option<Handle> {
        self.boundary
    }

    pub fn set_boundary(&mut self, handle: Option<Handle>) {
        self.boundary = handle;
    }

    /// Cached boundary handle, dropped from the cache if it no longer
    /// resolves to a live object.
    pub fn live_boundary<D: DocumentStore + ?Sized>(&mut self, doc: &D) -> Option<Handle> {
        let handle = self.boundary?;
        match doc.resolve_live(handle) {
            Ok(Some(_)) => Some(handle),
            _ => {
                tracing::debug!(document = %self.id, %handle, "cached boundary is stale");
                self.boundary = None;
                None
            }
        }
    }

    /// Applies one document event. Ignored while detached.
    ///
    /// Returns `true` if the event was consumed.
    pub fn handle_event(&mut self, event: &DocumentEvent) -> bool {
        if !self.attached {
            return false;
        }
        if let DocumentEvent::Erased(handle) = *event {
            if self.boundary == Some(handle) {
                tracing::debug!(document = %self.id, %handle, "boundary erased; cache cleared");
                self.boundary = None;
            }
            if contains_handle(&self.tree, handle) {
                tracing::debug!(document = %self.id, %handle, "referenced object erased");
                self.erased_owned.insert(handle);
            }
        }
        true
    }

    /// Referenced handles erased since the last scan.
    pub fn erased_since_scan(&self) -> &FxHashSet<Handle> {
        &self.erased_owned
    }

    /// True when referenced objects were erased since the last scan.
    pub fn needs_scan(&self) -> bool {
        !self.erased_owned.is_empty()
    }

    pub(crate) fn mark_scanned(&mut self) {
        self.erased_owned.clear();
    }
}

/// Contexts of every open document.
#[derive(Debug, Default)]
pub struct ContextRegistry {
    contexts: FxHashMap<DocumentId, DocumentContext>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context of `id`, created on first use.
    pub fn open(&mut self, id: DocumentId) -> &mut DocumentContext {
        self.contexts
            .entry(id)
            .or_insert_with(|| DocumentContext::new(id))
    }

    /// Installs a context, replacing and returning any previous one.
    pub fn insert(&mut self, context: DocumentContext) -> Option<DocumentContext> {
        let mut previous = self.contexts.insert(context.id(), context);
        if let Some(old) = previous.as_mut() {
            old.detach();
        }
        previous
    }

    pub fn get(&self, id: DocumentId) -> Option<&DocumentContext> {
        self.contexts.get(&id)
    }

    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut DocumentContext> {
        self.contexts.get_mut(&id)
    }

    /// Opens and subscribes the context of `id`.
    pub fn attach(&mut self, id: DocumentId) -> &mut DocumentContext {
        let context = self.open(id);
        context.attach();
        context
    }

    pub fn detach(&mut self, id: DocumentId) {
        if let Some(context) = self.contexts.get_mut(&id) {
            context.detach();
        }
    }

    /// Detaches and drops the context of a closed document.
    pub fn close(&mut self, id: DocumentId) -> Option<DocumentContext> {
        let mut context = self.contexts.remove(&id)?;
        context.detach();
        Some(context)
    }

    /// Delivers events to the context of `id`. Returns how many were
    /// consumed; events for unknown or detached documents are dropped.
    pub fn dispatch(&mut self, id: DocumentId, events: &[DocumentEvent]) -> usize {
        let Some(context) = self.contexts.get_mut(&id) else {
            return 0;
        };
        events.iter().filter(|e| context.handle_event(e)).count()
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Open document ids, sorted.
    pub fn ids(&self) -> Vec<DocumentId> {
        let mut ids: Vec<_> = self.contexts.keys().copied().collect();
        ids.sort();
        ids
    }
}
