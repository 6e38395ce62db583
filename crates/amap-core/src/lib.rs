//! Accessmap Core - typed data model for the accessibility pipeline
//!
//! The foundation the other crates build on:
//! - Strongly-typed identifiers and facility categories
//! - Coordinate reference systems and the WGS84 <-> UTM projector
//! - Run configuration (travel mode, thresholds, weighting policy)
//! - Invariant-checked record types (facilities, population cells,
//!   spatial units, accessibility records)
//! - The recoverable warning taxonomy surfaced alongside results
//!
//! Every entity here is an immutable snapshot for a single analysis run:
//! loaders construct them, downstream stages only read them.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod crs;
pub mod error;
pub mod ids;
pub mod records;
pub mod warn;

// Re-exports for convenience
pub use config::{RunConfig, TravelMode, Weighting, DEFAULT_SNAP_DISTANCE_M, DEFAULT_THRESHOLDS_MIN};
pub use crs::{Crs, Projector};
pub use error::ModelError;
pub use ids::{FacilityCategory, FacilityId, UnitId};
pub use records::{AccessibilityRecord, Facility, NodeRef, PopulationCell, SpatialUnit};
pub use warn::{LoadWarning, WarningLog};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for pipeline code
    pub use crate::{
        AccessibilityRecord, Crs, Facility, FacilityCategory, FacilityId, LoadWarning,
        ModelError, NodeRef, PopulationCell, Projector, RunConfig, SpatialUnit, TravelMode,
        UnitId, WarningLog, Weighting,
    };
}
