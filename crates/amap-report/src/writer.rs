//! Output writers
//!
//! Serializes the run's deliverables:
//! - `access.csv`: the flat accessibility table
//! - `catchments.geojson`: per (category, threshold) hull polygons in
//!   WGS84 for external mapping tools (visualization only; aggregation
//!   never reads these back)
//! - `run.json`: config echo, weighting flag, warning list; a run
//!   with warnings is never reported as silently clean

use crate::error::ReportError;
use amap_core::{AccessibilityRecord, LoadWarning, Projector, RunConfig, WarningLog, Weighting};
use amap_graph::{Catchment, RoadGraph};
use geo::{ConvexHull, MultiPoint, Point};
use geojson::{Feature, FeatureCollection, GeoJson};
use serde::Serialize;
use std::path::Path;

/// Sidecar metadata describing one run
#[derive(Debug, Serialize)]
pub struct RunMetadata<'a> {
    /// Configuration the run executed with
    pub config: &'a RunConfig,
    /// True when the precision-reducing centroid fallback was active
    pub centroid_fallback: bool,
    /// Number of records in the table
    pub record_count: usize,
    /// Accumulated recoverable warnings, in arrival order
    pub warnings: &'a [LoadWarning],
}

/// Write the accessibility table as CSV
///
/// One row per (unit x category x threshold), matching the record
/// order produced by aggregation.
///
/// # Errors
/// Returns [`ReportError`] on IO or serialization failure.
pub fn write_table(path: &Path, records: &[AccessibilityRecord]) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| ReportError::Csv {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    for record in records {
        writer.serialize(record).map_err(|e| ReportError::Csv {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    }
    writer.flush().map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), rows = records.len(), "accessibility table written");
    Ok(())
}

/// Write catchment hull polygons as a WGS84 GeoJSON layer
///
/// Each (category, threshold) pair with at least three covered nodes
/// contributes one convex-hull feature; smaller catchments are skipped
/// (nothing to draw).
///
/// # Errors
/// Returns [`ReportError`] on IO or serialization failure.
pub fn write_catchments(
    path: &Path,
    catchments: &[Catchment],
    config: &RunConfig,
    graph: &RoadGraph,
    projector: &Projector,
) -> Result<(), ReportError> {
    let mut features = Vec::new();
    for catchment in catchments {
        for &threshold_min in &config.thresholds_min {
            let threshold_secs = f64::from(threshold_min) * 60.0;
            let mut wgs84_points = Vec::new();
            for node in catchment.covered_nodes(threshold_secs) {
                let metric = graph.point(node)?;
                let (lon, lat) = projector.unproject(metric);
                wgs84_points.push(Point::new(lon, lat));
            }
            if wgs84_points.len() < 3 {
                tracing::debug!(
                    category = %catchment.category,
                    threshold_min,
                    nodes = wgs84_points.len(),
                    "catchment too small for a hull, skipping"
                );
                continue;
            }
            let hull = MultiPoint::new(wgs84_points).convex_hull();

            let mut properties = geojson::JsonObject::new();
            properties.insert(
                "category".to_string(),
                serde_json::Value::String(catchment.category.to_string()),
            );
            properties.insert(
                "threshold_minutes".to_string(),
                serde_json::Value::from(threshold_min),
            );
            features.push(Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(&hull))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            });
        }
    }

    let collection = GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    });
    std::fs::write(path, collection.to_string()).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "catchment layer written");
    Ok(())
}

/// Write the run-metadata sidecar
///
/// # Errors
/// Returns [`ReportError`] on IO or serialization failure.
pub fn write_run_metadata(
    path: &Path,
    config: &RunConfig,
    records: &[AccessibilityRecord],
    warnings: &WarningLog,
) -> Result<(), ReportError> {
    let metadata = RunMetadata {
        config,
        centroid_fallback: config.weighting == Weighting::Centroid,
        record_count: records.len(),
        warnings: warnings.as_slice(),
    };
    let json = serde_json::to_string_pretty(&metadata)?;
    std::fs::write(path, json).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if !warnings.is_empty() {
        tracing::warn!(
            path = %path.display(),
            warnings = warnings.len(),
            "run completed with warnings"
        );
    }
    Ok(())
}
