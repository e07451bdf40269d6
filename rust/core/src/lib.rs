// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Footing Core
//!
//! Shared vocabulary for foundation detailing:
//!
//! - [`Handle`]: stable, serializable identifiers of drawing objects with a
//!   lenient text parser built on [nom](https://docs.rs/nom)
//! - [`Vertex`] and [`Side`]: planar geometry carried between crates
//! - [`DocumentStore`]: the contract consumed from the hosting drawing
//!   database, with an in-memory implementation in [`MemoryDocument`]
//!
//! ## Feature Flags
//!
//! - `serde`: serialization support for handles and vertices

pub mod document;
pub mod error;
pub mod handle;
pub mod memory;
pub mod model;

pub use document::{DocumentEvent, DocumentObject, DocumentStore, ObjectKind};
pub use error::{Error, Result};
pub use handle::Handle;
pub use memory::MemoryDocument;
pub use model::{Side, Vertex};
