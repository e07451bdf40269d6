// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for record management and edge rebuilds.

use footing_core::Handle;

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Document store failure, including a rejected batch commit.
    #[error(transparent)]
    Core(#[from] footing_core::Error),

    #[error(transparent)]
    Geometry(#[from] footing_geometry::Error),

    #[error(transparent)]
    References(#[from] footing_references::Error),

    /// The handle is already stored elsewhere in the reference tree.
    #[error("handle {0} is already referenced by another record")]
    AlreadyRegistered(Handle),

    /// No record exists for the centerline.
    #[error("no record for centerline {0}")]
    RecordNotFound(Handle),
}

impl Error {
    /// True when the atomic batch itself failed to commit.
    pub fn is_transaction_failure(&self) -> bool {
        matches!(
            self,
            Error::Core(footing_core::Error::TransactionFailed(_))
                | Error::References(footing_references::Error::Core(
                    footing_core::Error::TransactionFailed(_)
                ))
        )
    }
}
