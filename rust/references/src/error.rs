// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for reference tree operations.

use footing_core::Handle;

use crate::category::Category;

/// Result type alias for reference tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or editing the reference tree.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A path segment names a leaf where an interior node was expected.
    #[error("path segment {0:?} is a leaf, not an interior node")]
    NotInterior(String),

    /// An interior node sits where a leaf was expected.
    #[error("key {0:?} holds a subtree, not a leaf")]
    NotALeaf(String),

    /// The node key does not belong to this tree (or was removed).
    #[error("node not found in reference tree")]
    NodeNotFound,

    /// No record is stored for the centerline handle.
    #[error("no {category} record for centerline {handle}")]
    RecordNotFound { category: Category, handle: Handle },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The document store refused an operation.
    #[error(transparent)]
    Core(#[from] footing_core::Error),
}
