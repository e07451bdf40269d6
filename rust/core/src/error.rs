// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types shared by the document-store contract.

use thiserror::Error;

use crate::handle::Handle;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by handles and document stores.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Text does not parse as a handle in any supported format.
    #[error("malformed handle text: {0:?}")]
    MalformedHandle(String),

    /// The handle is well-formed but no object with it exists.
    #[error("object not found: {0}")]
    ObjectNotFound(Handle),

    /// The store failed unexpectedly while resolving a handle.
    #[error("failed to resolve {handle}: {reason}")]
    ResolutionFailed { handle: Handle, reason: String },

    /// The atomic batch could not be committed.
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// Geometry handed to the store cannot form an object.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),
}
