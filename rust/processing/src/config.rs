// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Detailing configuration loaded from environment variables.

use footing_geometry::SynthesisConfig;
use footing_references::Category;
use serde::{Deserialize, Serialize};

/// Layer new edge objects are created on unless configured otherwise.
pub const DEFAULT_EDGE_LAYER: &str = "FOUNDATION-EDGES";

/// Detailing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailingConfig {
    /// Edge synthesis parameters.
    pub synthesis: SynthesisConfig,
    /// Layer for generated edge objects.
    pub edge_layer: String,
    /// Category the façade records beams under.
    pub category: Category,
}

impl DetailingConfig {
    /// Load configuration from environment variables.
    ///
    /// Absent or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            synthesis: SynthesisConfig {
                half_width: lookup("FOOTING_HALF_WIDTH")
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(defaults.synthesis.half_width),
                tolerance: lookup("FOOTING_TOLERANCE")
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(defaults.synthesis.tolerance),
                join_segments: lookup("FOOTING_JOIN_SEGMENTS")
                    .and_then(|v| parse_flag(&v))
                    .unwrap_or(defaults.synthesis.join_segments),
            },
            edge_layer: lookup("FOOTING_EDGE_LAYER")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.edge_layer),
            category: lookup("FOOTING_CATEGORY")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.category),
        }
    }
}

impl Default for DetailingConfig {
    fn default() -> Self {
        Self {
            synthesis: SynthesisConfig::default(),
            edge_layer: DEFAULT_EDGE_LAYER.to_string(),
            category: Category::GradeBeam,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
