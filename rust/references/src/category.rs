// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Top-level record categories, one per beam family.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Key of the well-known node that holds every category.
pub const ROOT_KEY: &str = "FOUNDATION_REFERENCES";

/// A beam family with its own subtree under [`ROOT_KEY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Boundary,
    GradeBeam,
    BeamStrand,
    SlabStrand,
    Rebar,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Boundary,
        Category::GradeBeam,
        Category::BeamStrand,
        Category::SlabStrand,
        Category::Rebar,
    ];

    /// Persisted key of the category node.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Boundary => "boundary",
            Category::GradeBeam => "grade-beam",
            Category::BeamStrand => "beam-strand",
            Category::SlabStrand => "slab-strand",
            Category::Rebar => "rebar",
        }
    }

    /// Looks a category up by its persisted key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == key)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| format!("unknown category {s:?}"))
    }
}
