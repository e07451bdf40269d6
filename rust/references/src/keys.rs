// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node keys for the arena-backed reference tree.
//!
//! Keys are generational: a key to a removed subtree stays invalid even if
//! its slot is reused.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a node (interior dictionary or leaf) of a [`crate::ReferenceTree`].
    pub struct NodeKey;
}
