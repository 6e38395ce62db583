//! Accessmap Report - from catchments to deliverables
//!
//! The back half of the pipeline:
//! - [`assign`]: distribute population cells over administrative units
//!   (areal interpolation, or the flagged centroid fallback)
//! - [`aggregate`]: per (unit x category x threshold) accessibility
//!   records with the no-double-counting weighting policy
//! - [`writer`]: CSV table, GeoJSON catchment layers, JSON run metadata

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod aggregate;
pub mod assign;
pub mod error;
pub mod writer;

// Re-exports for convenience
pub use aggregate::{aggregate, cell_coverage_fraction};
pub use assign::{assign_population, UnitAssignment};
pub use error::ReportError;
pub use writer::{write_catchments, write_run_metadata, write_table, RunMetadata};
