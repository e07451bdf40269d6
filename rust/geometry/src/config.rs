//! Synthesis parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default beam half-width in drawing units.
pub const DEFAULT_HALF_WIDTH: f64 = 6.0;

/// Default distance below which two points are the same point.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Parameters of one edge synthesis run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Perpendicular distance from a centerline to each of its edges.
    pub half_width: f64,
    /// Point-coincidence and band-boundary tolerance.
    pub tolerance: f64,
    /// Rejoin adjacent kept pieces into longer edge curves.
    pub join_segments: bool,
}

impl SynthesisConfig {
    /// Creates a configuration with the given half-width and default tolerance.
    pub fn with_half_width(half_width: f64) -> Self {
        Self {
            half_width,
            ..Self::default()
        }
    }

    /// Checks that every parameter is usable.
    pub fn validate(&self) -> Result<()> {
        if !self.half_width.is_finite() || self.half_width <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "half-width must be a positive number, got {}",
                self.half_width
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            half_width: DEFAULT_HALF_WIDTH,
            tolerance: DEFAULT_TOLERANCE,
            join_segments: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(SynthesisConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_half_width() {
        for w in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(SynthesisConfig::with_half_width(w).validate().is_err());
        }
    }

    #[test]
    fn rejects_negative_tolerance() {
        let config = SynthesisConfig {
            tolerance: -1e-3,
            ..SynthesisConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
