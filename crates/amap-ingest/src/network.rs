//! Road-network loader
//!
//! GeoJSON line features -> weighted [`RoadGraph`]. Each feature is one
//! road segment between its endpoints; endpoints landing on the same
//! centimeter grid cell share one graph node, which is how segments
//! connect into a traversable network. Length comes from the source's
//! `length` attribute when present, otherwise from the projected
//! polyline geometry.

use crate::error::IngestError;
use crate::speed::SpeedModel;
use crate::vector;
use amap_core::{Crs, LoadWarning, Projector, RunConfig, WarningLog};
use amap_graph::{GraphBuilder, RoadGraph};
use geo::{Euclidean, Length};
use std::path::Path;

/// Minimum usable segment length, meters
const MIN_SEGMENT_LENGTH_M: f64 = 0.1;

/// Load a road network and weight every edge for the run's travel mode
///
/// Individual degenerate or non-line features are skipped with
/// warnings; an unreadable source, an unsupported declared CRS, or a
/// file yielding no usable segment is fatal.
///
/// # Errors
/// Returns [`IngestError`] on whole-source failure.
pub fn load_network(
    path: &Path,
    declared_crs: Crs,
    projector: &Projector,
    config: &RunConfig,
) -> Result<(RoadGraph, WarningLog), IngestError> {
    let features = vector::read_features(path)?;
    let speeds = SpeedModel::from_config(config);
    let mut builder = GraphBuilder::new();
    let mut warnings = WarningLog::new();
    let mut segments = 0usize;

    for (index, feature) in features.iter().enumerate() {
        let lines = match vector::to_geometry(feature) {
            Some(geo::Geometry::LineString(line)) => vec![line],
            Some(geo::Geometry::MultiLineString(multi)) => multi.0,
            Some(_) | None => {
                warnings.push(LoadWarning::InvalidFeature {
                    source: path.display().to_string(),
                    feature_index: index,
                    reason: "geometry is not a line".to_string(),
                });
                continue;
            }
        };

        let highway = vector::prop_str(feature, &["highway", "highway_str", "class"]);
        let maxspeed = vector::prop_f64(feature, &["maxspeed", "maxspeed_kph", "speed_kph"]);
        let oneway = vector::prop_bool(feature, &["oneway"]).unwrap_or(false);
        let length_attr = vector::prop_f64(feature, &["length", "length_m"]);
        let source_id = vector::prop_f64(feature, &["osmid", "id"]).map(|v| v as i64);

        for line in lines {
            let projected = match vector::reproject_line(&line, declared_crs, projector) {
                Ok(l) => l,
                Err(e) => {
                    return Err(IngestError::CrsMismatch {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    })
                }
            };
            let (Some(&first), Some(&last)) =
                (projected.coords().next(), projected.coords().last())
            else {
                warnings.push(LoadWarning::DegenerateEdge {
                    feature_index: index,
                    reason: "empty line".to_string(),
                });
                continue;
            };

            let length_m = length_attr
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or_else(|| Euclidean.length(&projected));
            if length_m < MIN_SEGMENT_LENGTH_M {
                warnings.push(LoadWarning::DegenerateEdge {
                    feature_index: index,
                    reason: format!("zero length ({length_m:.3}m)"),
                });
                continue;
            }

            let from = builder.intern_node(first.into(), source_id);
            let to = builder.intern_node(last.into(), None);
            let travel_secs = speeds.travel_secs(length_m, highway.as_deref(), maxspeed);
            match builder.add_segment(from, to, length_m, travel_secs, oneway) {
                Ok(()) => segments += 1,
                Err(e) => warnings.push(LoadWarning::DegenerateEdge {
                    feature_index: index,
                    reason: e.to_string(),
                }),
            }
        }
    }

    if segments == 0 {
        return Err(IngestError::EmptySource {
            path: path.to_path_buf(),
        });
    }
    let graph = builder.build();
    tracing::info!(
        path = %path.display(),
        segments,
        skipped = warnings.len(),
        "road network loaded"
    );
    Ok((graph, warnings))
}
