// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared detailing pipeline used by the CLI.
//!
//! Ties the geometry and reference crates to a document: the
//! [`BeamRecordManager`] façade registers beams, rebuilds their edges in one
//! atomic batch and keeps the reference tree in step with the drawing.
//! Per-document state lives in a [`DocumentContext`].

pub mod config;
pub mod context;
pub mod error;
pub mod manager;
pub mod synthesis;

pub use config::{DetailingConfig, DEFAULT_EDGE_LAYER};
pub use context::{ContextRegistry, DocumentContext, DocumentId};
pub use error::{Error, Result};
pub use manager::{BeamRecordManager, Owner, Role};
pub use synthesis::SynthesisReport;
