// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The contract consumed from the hosting drawing database.
//!
//! The document owns every drawable object. This workspace only ever holds
//! [`Handle`]s to those objects and resolves them again on each use, since
//! the user may erase anything between two commands.

use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::model::Vertex;

/// Kind of a line-like document object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Two-vertex line.
    Line,
    /// Open polyline with straight segments.
    Polyline,
}

impl ObjectKind {
    /// Picks the object kind for a vertex count.
    pub fn for_vertex_count(count: usize) -> Self {
        if count == 2 {
            ObjectKind::Line
        } else {
            ObjectKind::Polyline
        }
    }
}

/// A resolved document object.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentObject {
    pub handle: Handle,
    pub kind: ObjectKind,
    pub layer: String,
    /// Erased objects may still resolve until the database is purged.
    pub erased: bool,
}

impl DocumentObject {
    /// Returns `true` if the object exists and is not erased.
    #[inline]
    pub fn is_live(&self) -> bool {
        !self.erased
    }
}

/// Change notifications emitted by a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentEvent {
    Created(Handle),
    Erased(Handle),
}

impl DocumentEvent {
    pub fn handle(&self) -> Handle {
        match self {
            DocumentEvent::Created(h) | DocumentEvent::Erased(h) => *h,
        }
    }
}

/// Minimal drawing-database contract.
pub trait DocumentStore {
    /// Adds a line-like object and returns its stable handle.
    fn create_object(&mut self, geometry: &[Vertex], layer: &str) -> Result<Handle>;

    /// Marks an object erased. Later resolves report it as not live.
    fn erase_object(&mut self, handle: Handle) -> Result<()>;

    /// Looks an object up by handle.
    ///
    /// `Ok(None)` means the handle is unknown to the document; `Err` is an
    /// unexpected failure of the store itself.
    fn resolve(&self, handle: Handle) -> Result<Option<DocumentObject>>;

    /// Reads the ordered vertices of a live object.
    fn read_geometry(&self, handle: Handle) -> Option<Vec<Vertex>>;

    /// Runs `f` as one batch: every change commits together, or none does.
    fn run_atomic<T, E, F>(&mut self, f: F) -> std::result::Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> std::result::Result<T, E>,
        E: From<Error>;

    /// Resolves a handle and keeps it only if the object is live.
    fn resolve_live(&self, handle: Handle) -> Result<Option<DocumentObject>> {
        Ok(self.resolve(handle)?.filter(DocumentObject::is_live))
    }
}
