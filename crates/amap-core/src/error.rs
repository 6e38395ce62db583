//! Error types for the core data model
//!
//! Covers invariant violations detected at construction time:
//! - Malformed identifiers and categories
//! - Out-of-range populations and coverage fractions
//! - Unsupported coordinate reference systems

/// Errors raised while constructing core records
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Facility category token was blank
    #[error("facility category is empty")]
    EmptyCategory,

    /// Population count below zero
    #[error("negative population {value} for {context}")]
    NegativePopulation { context: String, value: f64 },

    /// Coverage fraction outside [0, 1]
    #[error("coverage fraction {value} outside [0, 1] for unit {unit}")]
    FractionOutOfRange { unit: String, value: f64 },

    /// Covered population exceeds total population
    #[error("covered population {covered} exceeds total {total} for unit {unit}")]
    CoveredExceedsTotal {
        unit: String,
        covered: f64,
        total: f64,
    },

    /// Travel-time weight below zero
    #[error("negative travel time {secs}s on edge {edge}")]
    NegativeTravelTime { edge: String, secs: f64 },

    /// CRS string not recognized
    #[error("unsupported CRS '{0}': only EPSG:4326 and UTM (EPSG:326xx/327xx) are supported")]
    UnsupportedCrs(String),

    /// Coordinate outside the valid range for its CRS
    #[error("coordinate ({x}, {y}) invalid for {crs}")]
    InvalidCoordinate { crs: String, x: f64, y: f64 },

    /// Configuration rejected at validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
