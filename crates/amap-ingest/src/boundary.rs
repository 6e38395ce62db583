//! Administrative-boundary loader
//!
//! GeoJSON polygons -> [`SpatialUnit`] records. Units are expected to
//! partition the study area; gaps and overlaps are tolerated here and
//! handled by the aggregation stage's weighting policy.

use crate::error::IngestError;
use crate::vector;
use amap_core::{Crs, LoadWarning, Projector, SpatialUnit, UnitId, WarningLog};
use geo::MultiPolygon;
use std::path::Path;

/// Recognized unit-code attribute names
const ID_KEYS: &[&str] = &["id", "unit_id", "ADM2_PCODE", "code", "ward_code"];
/// Recognized unit-name attribute names
const NAME_KEYS: &[&str] = &["name", "NAME", "COUNTY", "ward"];

/// Load administrative units
///
/// Features without polygon geometry are skipped with warnings; a
/// source yielding no unit at all is fatal.
///
/// # Errors
/// Returns [`IngestError`] on whole-source failure.
pub fn load_units(
    path: &Path,
    declared_crs: Crs,
    projector: &Projector,
) -> Result<(Vec<SpatialUnit>, WarningLog), IngestError> {
    let features = vector::read_features(path)?;
    let mut units = Vec::new();
    let mut warnings = WarningLog::new();

    for (index, feature) in features.iter().enumerate() {
        let geometry = match vector::to_geometry(feature) {
            Some(geo::Geometry::Polygon(p)) => MultiPolygon::new(vec![p]),
            Some(geo::Geometry::MultiPolygon(mp)) => mp,
            Some(_) | None => {
                warnings.push(LoadWarning::InvalidFeature {
                    source: path.display().to_string(),
                    feature_index: index,
                    reason: "geometry is not a polygon".to_string(),
                });
                continue;
            }
        };
        let projected = vector::reproject_multipolygon(&geometry, declared_crs, projector)
            .map_err(|e| IngestError::CrsMismatch {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let id = vector::prop_str(feature, ID_KEYS).unwrap_or_else(|| format!("unit{index}"));
        let name = vector::prop_str(feature, NAME_KEYS).unwrap_or_else(|| id.clone());
        units.push(SpatialUnit::new(UnitId::new(id), name, projected));
    }

    if units.is_empty() {
        return Err(IngestError::EmptySource {
            path: path.to_path_buf(),
        });
    }
    tracing::info!(path = %path.display(), units = units.len(), "administrative units loaded");
    Ok((units, warnings))
}
