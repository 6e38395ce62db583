//! Accessmap Ingest - input loaders
//!
//! Turns flat geospatial files into the typed, already-reprojected
//! records the rest of the pipeline consumes:
//! - [`network`]: GeoJSON road segments -> weighted [`amap_graph::RoadGraph`]
//! - [`facility`]: GeoJSON/CSV service points, snapped to the graph
//! - [`population`]: ESRI ASCII grid raster or GeoJSON polygons
//! - [`boundary`]: administrative unit polygons
//!
//! Error discipline: a malformed individual record is skipped with an
//! accumulated [`amap_core::LoadWarning`]; an unreadable or unparseable
//! source is a fatal [`IngestError`] naming the failing file.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod boundary;
pub mod error;
pub mod facility;
pub mod network;
pub mod population;
pub mod speed;
pub mod vector;

// Re-exports for convenience
pub use boundary::load_units;
pub use error::IngestError;
pub use facility::load_facilities;
pub use network::load_network;
pub use population::{load_population_raster, load_population_vector, AsciiGrid};
pub use speed::SpeedModel;
