// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Footing References
//!
//! Persistent metadata that ties foundation beams to the drawing objects
//! generated for them. A [`ReferenceTree`] stores, per category, one record
//! per beam centerline with the handles of its edge objects. Handles are
//! weak: the drawing may erase objects behind the tree's back, and the
//! integrity [`scan`] reports which stored handles still resolve.
//!
//! ## Example
//!
//! ```
//! use footing_core::{DocumentStore, MemoryDocument, Vertex};
//! use footing_references::{scan, Category, ReferenceTree};
//!
//! let mut doc = MemoryDocument::new();
//! let beam = doc
//!     .create_object(&[Vertex::new(0.0, 0.0), Vertex::new(10.0, 0.0)], "beams")
//!     .unwrap();
//!
//! let mut tree = ReferenceTree::new();
//! tree.ensure_record(Category::GradeBeam, beam).unwrap();
//! assert!(scan(&tree, &doc).is_clean());
//! ```

pub mod category;
pub mod error;
pub mod keys;
pub mod record;
pub mod scan;
pub mod serialization;
pub mod tree;

pub use category::{Category, ROOT_KEY};
pub use error::{Error, Result};
pub use keys::NodeKey;
pub use record::{delete_record, BeamRecord, CENTERLINE_KEY, EDGES_KEY, METADATA_KEY};
pub use scan::{
    classify, cleanup, cleanup_cascading, contains_handle, scan, CleanupSummary, HandleEntry,
    HandleStatus, ScanReport,
};
pub use serialization::{RecordLayout, TreeLayout};
pub use tree::{resolve, LeafValue, Node, ReferenceTree};
