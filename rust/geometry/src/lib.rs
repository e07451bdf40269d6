//! Footing Geometry
//!
//! Planar edge geometry for foundation beams: centerline offsetting,
//! segment intersection, band containment, splitting and joining, and the
//! [`EdgeSynthesizer`] that trims every beam's edges against its neighbors.
//! Math runs on nalgebra; the trim stage fans out over rayon.

pub mod band;
pub mod config;
pub mod error;
pub mod intersect;
pub mod join;
pub mod offset;
pub mod polyline;
pub mod split;
pub mod synthesis;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Vector2};

pub use band::point_in_band;
pub use config::SynthesisConfig;
pub use error::{Error, Result};
pub use intersect::{intersect_segments, polyline_intersections};
pub use join::join;
pub use offset::offset;
pub use polyline::Polyline;
pub use split::split;
pub use synthesis::{BeamBand, BeamCenterline, BeamEdges, EdgeSynthesizer, SynthesisOutcome};
