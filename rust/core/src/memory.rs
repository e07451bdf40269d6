// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory document store.
//!
//! [`MemoryDocument`] backs the command-line driver and the test suites. It
//! allocates handles sequentially like a drawing database, keeps erased
//! objects resolvable (flagged `erased`), queues change events, and
//! implements batches by snapshotting its object table.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::document::{DocumentEvent, DocumentObject, DocumentStore, ObjectKind};
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::model::Vertex;

/// First handle handed out by a fresh document.
const DEFAULT_FIRST_HANDLE: u64 = 0x100;

#[derive(Debug, Clone)]
struct StoredObject {
    object: DocumentObject,
    vertices: Vec<Vertex>,
}

/// A drawing database held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    objects: FxHashMap<Handle, StoredObject>,
    next_handle: u64,
    events: Vec<DocumentEvent>,
    faulty: FxHashSet<Handle>,
    fail_next_commit: bool,
    batch_depth: usize,
}

impl MemoryDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::with_first_handle(DEFAULT_FIRST_HANDLE)
    }

    /// Creates an empty document whose first allocated handle is `first`.
    pub fn with_first_handle(first: u64) -> Self {
        Self {
            objects: FxHashMap::default(),
            next_handle: first.max(1),
            events: Vec::new(),
            faulty: FxHashSet::default(),
            fail_next_commit: false,
            batch_depth: 0,
        }
    }

    /// Inserts an object under a caller-chosen handle, as when a drawing is
    /// opened with existing content.
    pub fn insert_with_handle(
        &mut self,
        handle: Handle,
        geometry: &[Vertex],
        layer: &str,
    ) -> Result<()> {
        if geometry.len() < 2 {
            return Err(Error::DegenerateGeometry(format!(
                "object {} needs at least 2 vertices, got {}",
                handle,
                geometry.len()
            )));
        }
        if self.objects.contains_key(&handle) {
            return Err(Error::TransactionFailed(format!(
                "handle {} is already in use",
                handle
            )));
        }
        self.store(handle, geometry, layer);
        self.next_handle = self.next_handle.max(handle.value() + 1);
        Ok(())
    }

    /// Makes every later resolve of `handle` fail with an unexpected error.
    pub fn inject_resolution_fault(&mut self, handle: Handle) {
        self.faulty.insert(handle);
    }

    /// Removes all injected resolution faults.
    pub fn clear_faults(&mut self) {
        self.faulty.clear();
    }

    /// Makes the next outermost batch fail at commit time.
    pub fn fail_next_commit(&mut self) {
        self.fail_next_commit = true;
    }

    /// Takes every queued change event.
    pub fn drain_events(&mut self) -> Vec<DocumentEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of live objects.
    pub fn live_count(&self) -> usize {
        self.objects.values().filter(|o| o.object.is_live()).count()
    }

    /// Returns `true` if the handle names a live object.
    pub fn is_live(&self, handle: Handle) -> bool {
        self.objects
            .get(&handle)
            .map(|o| o.object.is_live())
            .unwrap_or(false)
    }

    /// Handles of all live objects on `layer`, in ascending order.
    pub fn handles_on_layer(&self, layer: &str) -> Vec<Handle> {
        let mut handles: Vec<Handle> = self
            .objects
            .values()
            .filter(|o| o.object.is_live() && o.object.layer == layer)
            .map(|o| o.object.handle)
            .collect();
        handles.sort_unstable();
        handles
    }

    fn store(&mut self, handle: Handle, geometry: &[Vertex], layer: &str) {
        self.objects.insert(
            handle,
            StoredObject {
                object: DocumentObject {
                    handle,
                    kind: ObjectKind::for_vertex_count(geometry.len()),
                    layer: layer.to_string(),
                    erased: false,
                },
                vertices: geometry.to_vec(),
            },
        );
        self.events.push(DocumentEvent::Created(handle));
    }

    fn allocate(&mut self) -> Result<Handle> {
        let handle = Handle::new(self.next_handle)
            .ok_or_else(|| Error::TransactionFailed("handle space exhausted".to_string()))?;
        self.next_handle = self
            .next_handle
            .checked_add(1)
            .ok_or_else(|| Error::TransactionFailed("handle space exhausted".to_string()))?;
        Ok(handle)
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryDocument {
    fn create_object(&mut self, geometry: &[Vertex], layer: &str) -> Result<Handle> {
        if geometry.len() < 2 {
            return Err(Error::DegenerateGeometry(format!(
                "line-like object needs at least 2 vertices, got {}",
                geometry.len()
            )));
        }
        let handle = self.allocate()?;
        self.store(handle, geometry, layer);
        tracing::trace!(handle = %handle, layer, vertices = geometry.len(), "created object");
        Ok(handle)
    }

    fn erase_object(&mut self, handle: Handle) -> Result<()> {
        match self.objects.get_mut(&handle) {
            Some(stored) if stored.object.is_live() => {
                stored.object.erased = true;
                self.events.push(DocumentEvent::Erased(handle));
                tracing::trace!(handle = %handle, "erased object");
                Ok(())
            }
            _ => Err(Error::ObjectNotFound(handle)),
        }
    }

    fn resolve(&self, handle: Handle) -> Result<Option<DocumentObject>> {
        if self.faulty.contains(&handle) {
            return Err(Error::ResolutionFailed {
                handle,
                reason: "object table entry is corrupt".to_string(),
            });
        }
        Ok(self.objects.get(&handle).map(|o| o.object.clone()))
    }

    fn read_geometry(&self, handle: Handle) -> Option<Vec<Vertex>> {
        self.objects
            .get(&handle)
            .filter(|o| o.object.is_live())
            .map(|o| o.vertices.clone())
    }

    fn run_atomic<T, E, F>(&mut self, f: F) -> std::result::Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> std::result::Result<T, E>,
        E: From<Error>,
    {
        // Nested batches join the outer one.
        if self.batch_depth > 0 {
            return f(self);
        }

        let objects = self.objects.clone();
        let next_handle = self.next_handle;
        let event_mark = self.events.len();

        self.batch_depth += 1;
        let outcome = f(self);
        self.batch_depth -= 1;

        let outcome = match outcome {
            Ok(_) if std::mem::take(&mut self.fail_next_commit) => Err(E::from(
                Error::TransactionFailed("commit rejected by document".to_string()),
            )),
            other => other,
        };

        if outcome.is_err() {
            self.objects = objects;
            self.next_handle = next_handle;
            self.events.truncate(event_mark);
            tracing::debug!("batch discarded");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> Vec<Vertex> {
        vec![Vertex::new(0.0, 0.0), Vertex::new(10.0, 0.0)]
    }

    #[test]
    fn handles_are_sequential() {
        let mut doc = MemoryDocument::new();
        let a = doc.create_object(&line(), "0").unwrap();
        let b = doc.create_object(&line(), "0").unwrap();
        assert_eq!(a.value(), 0x100);
        assert_eq!(b.value(), 0x101);
    }

    #[test]
    fn degenerate_geometry_is_rejected() {
        let mut doc = MemoryDocument::new();
        let err = doc.create_object(&[Vertex::new(0.0, 0.0)], "0").unwrap_err();
        assert!(matches!(err, Error::DegenerateGeometry(_)));
    }

    #[test]
    fn erased_objects_still_resolve_but_are_not_live() {
        let mut doc = MemoryDocument::new();
        let h = doc.create_object(&line(), "0").unwrap();
        doc.erase_object(h).unwrap();

        let obj = doc.resolve(h).unwrap().unwrap();
        assert!(obj.erased);
        assert!(doc.resolve_live(h).unwrap().is_none());
        assert!(doc.read_geometry(h).is_none());
        assert!(matches!(doc.erase_object(h), Err(Error::ObjectNotFound(_))));
    }

    #[test]
    fn unknown_handle_resolves_to_none() {
        let doc = MemoryDocument::new();
        assert!(doc.resolve(Handle::new(0xDEAD).unwrap()).unwrap().is_none());
    }

    #[test]
    fn injected_fault_surfaces_as_error() {
        let mut doc = MemoryDocument::new();
        let h = doc.create_object(&line(), "0").unwrap();
        doc.inject_resolution_fault(h);
        assert!(matches!(doc.resolve(h), Err(Error::ResolutionFailed { .. })));
    }

    #[test]
    fn insert_with_handle_bumps_allocator() {
        let mut doc = MemoryDocument::new();
        let fixed = Handle::new(0x1A2).unwrap();
        doc.insert_with_handle(fixed, &line(), "CL").unwrap();
        let next = doc.create_object(&line(), "0").unwrap();
        assert_eq!(next.value(), 0x1A3);
        assert!(doc.insert_with_handle(fixed, &line(), "CL").is_err());
    }

    #[test]
    fn failed_batch_is_discarded() {
        let mut doc = MemoryDocument::new();
        let kept = doc.create_object(&line(), "0").unwrap();
        doc.drain_events();

        let result: std::result::Result<(), Error> = doc.run_atomic(|d| {
            d.create_object(&line(), "0")?;
            d.erase_object(kept)?;
            Err(Error::DegenerateGeometry("abort".to_string()))
        });

        assert!(result.is_err());
        assert!(doc.is_live(kept));
        assert_eq!(doc.live_count(), 1);
        assert!(doc.drain_events().is_empty());
        // The rolled-back handle is handed out again.
        assert_eq!(doc.create_object(&line(), "0").unwrap().value(), 0x101);
    }

    #[test]
    fn rejected_commit_is_discarded() {
        let mut doc = MemoryDocument::new();
        doc.fail_next_commit();
        let result: std::result::Result<Handle, Error> =
            doc.run_atomic(|d| d.create_object(&line(), "0"));
        assert!(matches!(result, Err(Error::TransactionFailed(_))));
        assert_eq!(doc.live_count(), 0);

        // The failure flag is consumed.
        let result: std::result::Result<Handle, Error> =
            doc.run_atomic(|d| d.create_object(&line(), "0"));
        assert!(result.is_ok());
    }

    #[test]
    fn nested_batches_commit_with_the_outer_batch() {
        let mut doc = MemoryDocument::new();
        let result: std::result::Result<(), Error> = doc.run_atomic(|d| {
            let inner: std::result::Result<Handle, Error> =
                d.run_atomic(|d| d.create_object(&line(), "0"));
            inner?;
            Err(Error::TransactionFailed("outer".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(doc.live_count(), 0);
    }

    #[test]
    fn layer_listing() {
        let mut doc = MemoryDocument::new();
        let a = doc.create_object(&line(), "EDGE").unwrap();
        doc.create_object(&line(), "CL").unwrap();
        assert_eq!(doc.handles_on_layer("EDGE"), vec![a]);
    }
}
