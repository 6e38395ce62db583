//! Run configuration
//!
//! One immutable [`RunConfig`] drives a whole analysis run. It is built
//! from CLI flags (optionally seeded from a TOML file), validated once,
//! and echoed verbatim into the run metadata output.

use crate::crs::Crs;
use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Default maximum snap distance from a facility to the road graph
pub const DEFAULT_SNAP_DISTANCE_M: f64 = 150.0;

/// Default travel-time thresholds, minutes
pub const DEFAULT_THRESHOLDS_MIN: [u32; 3] = [10, 20, 30];

/// Default walking speed, km/h
pub const DEFAULT_WALK_SPEED_KMH: f64 = 4.5;

/// Travel mode the edge weights are derived for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    /// Fixed pedestrian speed on every edge
    Walk,
    /// Road-class-dependent driving speeds
    Drive,
}

impl FromStr for TravelMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "walk" => Ok(Self::Walk),
            "drive" => Ok(Self::Drive),
            other => Err(ModelError::InvalidConfig(format!(
                "unknown travel mode '{other}' (expected walk|drive)"
            ))),
        }
    }
}

impl Display for TravelMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Walk => write!(f, "walk"),
            Self::Drive => write!(f, "drive"),
        }
    }
}

/// Population weighting policy for cells straddling boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weighting {
    /// Proportional area weighting of each cell fragment
    Areal,
    /// Binary inclusion by cell centroid (precision-reducing fallback,
    /// flagged in run metadata)
    Centroid,
}

impl FromStr for Weighting {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "areal" => Ok(Self::Areal),
            "centroid" => Ok(Self::Centroid),
            other => Err(ModelError::InvalidConfig(format!(
                "unknown weighting '{other}' (expected areal|centroid)"
            ))),
        }
    }
}

impl Display for Weighting {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Areal => write!(f, "areal"),
            Self::Centroid => write!(f, "centroid"),
        }
    }
}

/// Immutable configuration for one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Travel mode for edge weighting
    pub mode: TravelMode,
    /// Travel-time thresholds, minutes, ascending
    pub thresholds_min: Vec<u32>,
    /// Maximum facility snap distance, meters
    pub snap_distance_m: f64,
    /// Population weighting policy
    pub weighting: Weighting,
    /// Common projected CRS all inputs are reprojected to
    pub metric_crs: Crs,
    /// Walking speed, km/h (used when `mode` is walk)
    pub walk_speed_kmh: f64,
    /// Samples per cell axis for areal coverage estimation
    pub areal_samples: u8,
}

impl RunConfig {
    /// Configuration with the study-area defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            mode: TravelMode::Walk,
            thresholds_min: DEFAULT_THRESHOLDS_MIN.to_vec(),
            snap_distance_m: DEFAULT_SNAP_DISTANCE_M,
            weighting: Weighting::Areal,
            metric_crs: Crs::STUDY_DEFAULT,
            walk_speed_kmh: DEFAULT_WALK_SPEED_KMH,
            areal_samples: 3,
        }
    }

    /// Validate invariants the rest of the pipeline relies on
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidConfig`] with the first violation.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.thresholds_min.is_empty() {
            return Err(ModelError::InvalidConfig(
                "at least one threshold required".to_string(),
            ));
        }
        if self.thresholds_min.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ModelError::InvalidConfig(
                "thresholds must be strictly ascending".to_string(),
            ));
        }
        if self.thresholds_min.iter().any(|&t| t == 0) {
            return Err(ModelError::InvalidConfig(
                "thresholds must be positive minutes".to_string(),
            ));
        }
        if !self.snap_distance_m.is_finite() || self.snap_distance_m <= 0.0 {
            return Err(ModelError::InvalidConfig(format!(
                "snap distance must be positive, got {}",
                self.snap_distance_m
            )));
        }
        if !self.walk_speed_kmh.is_finite() || self.walk_speed_kmh <= 0.0 {
            return Err(ModelError::InvalidConfig(format!(
                "walk speed must be positive, got {}",
                self.walk_speed_kmh
            )));
        }
        if !self.metric_crs.is_projected() {
            return Err(ModelError::InvalidConfig(
                "metric CRS must be projected".to_string(),
            ));
        }
        if self.areal_samples == 0 {
            return Err(ModelError::InvalidConfig(
                "areal sample count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Thresholds converted to seconds, preserving order
    #[must_use]
    pub fn thresholds_secs(&self) -> Vec<f64> {
        self.thresholds_min
            .iter()
            .map(|&m| f64::from(m) * 60.0)
            .collect()
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_is_valid() {
        RunConfig::new().validate().unwrap();
    }

    #[test]
    fn rejects_unsorted_thresholds() {
        let cfg = RunConfig {
            thresholds_min: vec![20, 10],
            ..RunConfig::new()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_snap_distance() {
        let cfg = RunConfig {
            snap_distance_m: 0.0,
            ..RunConfig::new()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn threshold_seconds_conversion() {
        let cfg = RunConfig::new();
        assert_eq!(cfg.thresholds_secs(), vec![600.0, 1200.0, 1800.0]);
    }
}
