// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use footing_core::{DocumentStore, Handle, MemoryDocument, Side, Vertex};
use footing_processing::{
    BeamRecordManager, ContextRegistry, DetailingConfig, DocumentContext, DocumentId, Error,
    Role,
};
use footing_references::{
    Category, HandleStatus, LeafValue, ReferenceTree, CENTERLINE_KEY, EDGES_KEY,
};

fn manager<'a>(
    context: &'a mut DocumentContext,
    doc: &'a mut MemoryDocument,
) -> BeamRecordManager<'a, MemoryDocument> {
    BeamRecordManager::new(context, doc, DetailingConfig::default())
}

fn line(a: (f64, f64), b: (f64, f64)) -> Vec<Vertex> {
    vec![Vertex::from(a), Vertex::from(b)]
}

/// Two beams crossing at (50, 0), registered but without edges.
fn crossing_beams() -> (MemoryDocument, DocumentContext, Handle, Handle) {
    let mut doc = MemoryDocument::new();
    let a = doc.create_object(&line((0.0, 0.0), (100.0, 0.0)), "beams").unwrap();
    let b = doc.create_object(&line((50.0, -50.0), (50.0, 50.0)), "beams").unwrap();
    let mut context = DocumentContext::new(DocumentId(1));
    {
        let mut m = manager(&mut context, &mut doc);
        m.register_centerline(a).unwrap();
        m.register_centerline(b).unwrap();
    }
    (doc, context, a, b)
}

#[test]
fn scenario_a_rebuild_records_trimmed_edges() {
    let (mut doc, mut context, a, b) = crossing_beams();
    let mut m = manager(&mut context, &mut doc);

    let report = m.rebuild_edges(&[a, b]).unwrap();
    assert_eq!(report.purged, 0);
    assert_eq!(report.created, 8);
    assert_eq!(report.discarded_pieces, 4);
    assert!(report.stale.is_empty());

    for beam in [a, b] {
        let record = m.load(beam).unwrap();
        assert_eq!(record.left.len(), 2);
        assert_eq!(record.right.len(), 2);
        for edge in record.edge_handles() {
            assert!(m.is_live(edge));
        }
    }
    assert!(m.scan().is_clean());
    assert_eq!(m.document().handles_on_layer("FOUNDATION-EDGES").len(), 8);
}

#[test]
fn rebuild_replaces_rather_than_accumulates() {
    let (mut doc, mut context, a, b) = crossing_beams();
    let mut m = manager(&mut context, &mut doc);
    let first = m.rebuild_edges(&[a, b]).unwrap();
    let old_edges: Vec<Handle> = m.load(a).unwrap().edge_handles().collect();

    let second = m.rebuild_edges(&[a, b]).unwrap();
    assert_eq!(second.purged, first.created);
    assert_eq!(second.created, first.created);
    assert_eq!(m.document().handles_on_layer("FOUNDATION-EDGES").len(), 8);
    for edge in old_edges {
        assert!(!m.is_live(edge));
    }
}

#[test]
fn scenario_b_single_beam_purges_only() {
    let mut doc = MemoryDocument::new();
    let beam = doc.create_object(&line((0.0, 0.0), (100.0, 0.0)), "beams").unwrap();
    let left = doc.create_object(&line((0.0, 6.0), (100.0, 6.0)), "edges").unwrap();
    let right = doc.create_object(&line((0.0, -6.0), (100.0, -6.0)), "edges").unwrap();

    let mut context = DocumentContext::new(DocumentId(1));
    let mut m = manager(&mut context, &mut doc);
    m.register_centerline(beam).unwrap();
    m.store_edges(beam, &[left], &[right]).unwrap();

    let report = m.rebuild_edges(&[beam]).unwrap();
    assert_eq!(report.purged, 2);
    assert_eq!(report.created, 0);

    let record = m.load(beam).unwrap();
    assert!(record.left.is_empty());
    assert!(record.right.is_empty());
    assert!(!m.is_live(left));
    assert!(!m.is_live(right));
    assert!(m.is_live(beam));
}

#[test]
fn scenario_c_cleanup_is_leaf_local() {
    let mut doc = MemoryDocument::new();
    let beam = Handle::parse("1A2").unwrap();
    doc.insert_with_handle(beam, &line((0.0, 0.0), (100.0, 0.0)), "beams")
        .unwrap();
    let mut context = DocumentContext::new(DocumentId(1));

    {
        let mut m = manager(&mut context, &mut doc);
        m.register_centerline(beam).unwrap();
        let report = m.scan();
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].status, HandleStatus::Valid);
        assert_eq!(report.entries[0].key, CENTERLINE_KEY);
        assert_eq!(report.entries[0].handle, Some(beam));
    }

    let left = doc.create_object(&line((0.0, 6.0), (100.0, 6.0)), "edges").unwrap();
    let right = doc.create_object(&line((0.0, -6.0), (100.0, -6.0)), "edges").unwrap();
    manager(&mut context, &mut doc)
        .store_edges(beam, &[left], &[right])
        .unwrap();

    // Erased behind the tree's back
    doc.erase_object(beam).unwrap();

    let mut m = manager(&mut context, &mut doc);
    let report = m.scan();
    let centerline = report.entries.iter().find(|e| e.is_centerline()).unwrap();
    assert_eq!(centerline.status, HandleStatus::Missing);
    assert_eq!(report.count(HandleStatus::Valid), 2);

    assert_eq!(m.cleanup(&report).unwrap(), 1);

    // Only the centerline leaf went; the edges subtree is now orphaned
    let tree = m.tree();
    let record = tree.get(&["FOUNDATION_REFERENCES", "grade-beam", "1A2"]).unwrap();
    assert!(tree.leaf(record, CENTERLINE_KEY).is_none());
    let edges = tree.child(record, EDGES_KEY).unwrap();
    assert_eq!(tree.enumerate(edges).len(), 2);
    assert!(m.is_live(left));
    assert!(m.is_live(right));
}

#[test]
fn cascading_cleanup_removes_orphaned_record() {
    let (mut doc, mut context, a, b) = crossing_beams();
    manager(&mut context, &mut doc).rebuild_edges(&[a, b]).unwrap();
    doc.erase_object(a).unwrap();

    let mut m = manager(&mut context, &mut doc);
    let report = m.scan();
    let summary = m.cleanup_cascading(&report).unwrap();
    assert_eq!(summary.records_removed, 1);
    assert_eq!(summary.objects_erased, 4);
    assert!(m.load(a).is_none());
    assert!(m.load(b).is_some());
    assert!(m.scan().is_clean());
}

#[test]
fn resolve_owner_finds_centerlines_and_edges() {
    let (mut doc, mut context, a, b) = crossing_beams();
    let mut m = manager(&mut context, &mut doc);
    m.rebuild_edges(&[a, b]).unwrap();

    let record = m.load(b).unwrap();
    let owner = m.resolve_owner(record.right[1]).unwrap();
    assert_eq!(owner.beam, b);
    assert_eq!(owner.category, Category::GradeBeam);
    assert_eq!(
        owner.role,
        Role::Edge {
            side: Side::Right,
            index: 1
        }
    );
    assert!(owner.role.is_edge());

    assert_eq!(m.resolve_owner(a).unwrap().role, Role::Centerline);
    assert!(m.resolve_owner(Handle::new(0xFFFFF).unwrap()).is_none());
}

#[test]
fn stale_centerlines_are_skipped_not_deleted() {
    let (mut doc, mut context, a, b) = crossing_beams();
    let c = doc.create_object(&line((0.0, 40.0), (100.0, 40.0)), "beams").unwrap();
    doc.erase_object(b).unwrap();

    let mut m = manager(&mut context, &mut doc);
    m.register_centerline(c).unwrap();
    let report = m.rebuild_edges(&[a, b, c]).unwrap();
    assert_eq!(report.stale, vec![b]);
    // a and c do not touch: one edge per side each
    assert_eq!(report.created, 4);
    assert!(m.load(b).is_some());
}

#[test]
fn stale_partner_leaves_live_beam_with_whole_edges() {
    let (mut doc, mut context, a, b) = crossing_beams();
    manager(&mut context, &mut doc).rebuild_edges(&[a, b]).unwrap();
    doc.erase_object(b).unwrap();

    let mut m = manager(&mut context, &mut doc);
    let report = m.rebuild_edges(&[a, b]).unwrap();
    assert_eq!(report.stale, vec![b]);
    assert_eq!(report.purged, 8);
    assert_eq!(report.created, 2);
    assert_eq!(report.discarded_pieces, 0);

    let record = m.load(a).unwrap();
    assert_eq!(record.left.len(), 1);
    assert_eq!(record.right.len(), 1);
    for edge in record.edge_handles() {
        assert!(m.is_live(edge));
    }
}

#[test]
fn failed_commit_leaves_both_stores_untouched() {
    let (mut doc, mut context, a, b) = crossing_beams();
    manager(&mut context, &mut doc).rebuild_edges(&[a, b]).unwrap();
    let tree_before = context.tree().clone();
    let live_before = doc.live_count();

    doc.fail_next_commit();
    let err = manager(&mut context, &mut doc)
        .rebuild_edges(&[a, b])
        .unwrap_err();
    assert!(err.is_transaction_failure());

    assert_eq!(*context.tree(), tree_before);
    assert_eq!(doc.live_count(), live_before);
    let m = manager(&mut context, &mut doc);
    for edge in m.load(a).unwrap().edge_handles() {
        assert!(m.is_live(edge));
    }
}

#[test]
fn scan_classifies_errors_and_malformed_text() {
    let (mut doc, mut context, a, b) = crossing_beams();
    doc.inject_resolution_fault(b);
    let record = context.tree().record_node(Category::GradeBeam, a).unwrap();
    let edges = context.tree().child(record, EDGES_KEY).unwrap();
    context
        .tree_mut()
        .set_leaf(edges, "LEFT_0", LeafValue::Handle("#bad#".into()))
        .unwrap();

    let report = manager(&mut context, &mut doc).scan();
    assert_eq!(report.count(HandleStatus::Error), 1);
    assert_eq!(report.count(HandleStatus::Invalid), 1);
    assert_eq!(report.count(HandleStatus::Valid), 1);
    assert!(!report.is_clean());
}

#[test]
fn tree_roundtrips_through_json() {
    let (mut doc, mut context, a, b) = crossing_beams();
    {
        let mut m = manager(&mut context, &mut doc);
        m.rebuild_edges(&[a, b]).unwrap();
        m.set_metadata(a, "{\"mark\":\"GB-1\"}").unwrap();
    }
    let json = context.tree().to_json().unwrap();
    let restored = ReferenceTree::from_json(&json).unwrap();
    assert_eq!(&restored, context.tree());

    let mut reopened = DocumentContext::with_tree(DocumentId(2), restored);
    let m = manager(&mut reopened, &mut doc);
    assert_eq!(m.metadata(a).as_deref(), Some("{\"mark\":\"GB-1\"}"));
    assert_eq!(m.load(b).unwrap().left.len(), 2);
}

#[test]
fn delete_record_cascades_through_document() {
    let (mut doc, mut context, a, b) = crossing_beams();
    let mut m = manager(&mut context, &mut doc);
    m.rebuild_edges(&[a, b]).unwrap();

    assert_eq!(m.delete_record(a).unwrap(), 5);
    assert!(m.load(a).is_none());
    assert!(!m.is_live(a));
    assert!(matches!(m.delete_record(a), Err(Error::RecordNotFound(_))));
}

#[test]
fn attached_context_flags_erased_references() {
    let (mut doc, _, a, b) = crossing_beams();
    let mut registry = ContextRegistry::new();
    let id = DocumentId(5);
    {
        let context = registry.attach(id);
        let mut m = manager(context, &mut doc);
        m.register_centerline(a).unwrap();
        m.register_centerline(b).unwrap();
    }
    doc.drain_events();

    doc.erase_object(b).unwrap();
    let events = doc.drain_events();
    assert_eq!(registry.dispatch(id, &events), 1);

    let context = registry.get_mut(id).unwrap();
    assert!(context.needs_scan());
    let report = manager(context, &mut doc).scan();
    assert_eq!(report.count(HandleStatus::Missing), 1);
    assert!(!registry.get(id).unwrap().needs_scan());
}
