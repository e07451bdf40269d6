// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plain data shared between the geometry and reference crates.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A planar point with an optional elevation.
///
/// The elevation is carried through every geometry operation but never
/// participates in the 2D math.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub elevation: Option<f64>,
}

impl Vertex {
    /// Creates a vertex without elevation.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            elevation: None,
        }
    }

    /// Creates a vertex with an elevation.
    #[inline]
    pub const fn with_elevation(x: f64, y: f64, elevation: f64) -> Self {
        Self {
            x,
            y,
            elevation: Some(elevation),
        }
    }

    /// Planar distance to another vertex.
    #[inline]
    pub fn distance(&self, other: &Vertex) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

impl From<(f64, f64)> for Vertex {
    fn from((x, y): (f64, f64)) -> Self {
        Vertex::new(x, y)
    }
}

/// Which side of a centerline an offset edge lies on, looking along the
/// centerline's direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// Key prefix used for edge leaves (`LEFT_0`, `RIGHT_3`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "LEFT",
            Side::Right => "RIGHT",
        }
    }

    /// Sign applied to the left-hand normal when offsetting.
    #[inline]
    pub fn sign(&self) -> f64 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }

    /// Builds the edge leaf key for the `index`-th edge on this side.
    pub fn edge_key(&self, index: usize) -> String {
        format!("{}_{}", self.as_str(), index)
    }

    /// Parses an edge leaf key back into its side and index.
    pub fn parse_edge_key(key: &str) -> Option<(Side, usize)> {
        let (prefix, index) = key.split_once('_')?;
        let side = match prefix {
            "LEFT" => Side::Left,
            "RIGHT" => Side::Right,
            _ => return None,
        };
        Some((side, index.parse().ok()?))
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
