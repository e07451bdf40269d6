// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Beam job files.
//!
//! ```json
//! {
//!   "config": { "synthesis": { "half_width": 6.0 } },
//!   "beams": [
//!     { "handle": "1A2", "points": [[0, 0], [100, 0]] },
//!     { "points": [[50, -50], [50, 50]] }
//!   ]
//! }
//! ```
//!
//! A bare array of beams is accepted as well.

use anyhow::{bail, Context, Result};
use footing_core::{DocumentStore, Handle, MemoryDocument, Vertex};
use footing_processing::DetailingConfig;
use serde::Deserialize;

/// Layer centerlines from the job file are placed on.
pub const BEAM_LAYER: &str = "FOUNDATION-BEAMS";

#[derive(Debug, Clone, Deserialize)]
pub struct BeamInput {
    /// Handle to open the centerline under; allocated when absent.
    #[serde(default)]
    pub handle: Option<String>,
    /// `[x, y]` or `[x, y, elevation]`.
    pub points: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum JobFile {
    Full {
        #[serde(default)]
        config: Option<DetailingConfig>,
        beams: Vec<BeamInput>,
    },
    Beams(Vec<BeamInput>),
}

impl JobFile {
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("job file is neither a beam list nor a job object")
    }

    pub fn config(&self) -> Option<&DetailingConfig> {
        match self {
            JobFile::Full { config, .. } => config.as_ref(),
            JobFile::Beams(_) => None,
        }
    }

    pub fn beams(&self) -> &[BeamInput] {
        match self {
            JobFile::Full { beams, .. } => beams,
            JobFile::Beams(beams) => beams,
        }
    }
}

impl BeamInput {
    pub fn vertices(&self) -> Result<Vec<Vertex>> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| match p.as_slice() {
                [x, y] => Ok(Vertex::new(*x, *y)),
                [x, y, z] => Ok(Vertex::with_elevation(*x, *y, *z)),
                _ => bail!("point {} has {} coordinates; expected 2 or 3", i, p.len()),
            })
            .collect()
    }
}

/// Opens every beam of the job in `doc` and returns their handles in file
/// order.
pub fn load_beams(doc: &mut MemoryDocument, beams: &[BeamInput]) -> Result<Vec<Handle>> {
    let mut handles = Vec::with_capacity(beams.len());
    for (i, beam) in beams.iter().enumerate() {
        let vertices = beam
            .vertices()
            .with_context(|| format!("beam {}", i))?;
        let handle = match &beam.handle {
            Some(text) => {
                let handle = Handle::parse(text).with_context(|| format!("beam {}", i))?;
                doc.insert_with_handle(handle, &vertices, BEAM_LAYER)
                    .with_context(|| format!("beam {}", i))?;
                handle
            }
            None => doc
                .create_object(&vertices, BEAM_LAYER)
                .with_context(|| format!("beam {}", i))?,
        };
        handles.push(handle);
    }
    Ok(handles)
}
