//! Facility loader
//!
//! Service points from GeoJSON or CSV, snapped to the nearest road
//! node. A facility farther than the snap distance from every node is
//! reported in the warning list and excluded from its category's
//! source set; that is a data-quality finding, never a fatal error.

use crate::error::IngestError;
use crate::vector;
use amap_core::{
    Crs, Facility, FacilityCategory, FacilityId, LoadWarning, Projector, RunConfig, WarningLog,
};
use amap_graph::NodeLocator;
use std::path::Path;

/// Recognized longitude column names, checked case-insensitively
const LON_COLUMNS: &[&str] = &["lon", "longitude", "lng", "x"];
/// Recognized latitude column names, checked case-insensitively
const LAT_COLUMNS: &[&str] = &["lat", "latitude", "y"];

/// Load facilities of one category and snap them to the road graph
///
/// Dispatches on file extension: `.csv` expects lon/lat columns (any
/// of the common spellings); everything else is read as GeoJSON
/// points. When the source carries a `category`/`amenity` attribute,
/// rows not matching `category` are filtered out.
///
/// # Errors
/// Returns [`IngestError`] when the source is unreadable, unparseable,
/// or lacks coordinate columns.
pub fn load_facilities(
    path: &Path,
    declared_crs: Crs,
    category: &FacilityCategory,
    locator: &NodeLocator,
    projector: &Projector,
    config: &RunConfig,
) -> Result<(Vec<Facility>, WarningLog), IngestError> {
    let raw = if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
    {
        read_csv_points(path, category)?
    } else {
        read_geojson_points(path, category)?
    };

    let mut facilities = Vec::with_capacity(raw.len());
    let mut warnings = WarningLog::new();

    for point in raw {
        let projected = projector
            .reproject(declared_crs, point.lon, point.lat)
            .map_err(|e| IngestError::CrsMismatch {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        match locator.snap(projected, config.snap_distance_m) {
            Ok((node, dist)) => facilities.push(Facility {
                id: point.id,
                name: point.name,
                category: category.clone(),
                point: projected,
                node,
                snap_distance_m: dist,
            }),
            Err(nearest) => warnings.push(LoadWarning::UnsnappedFacility {
                id: point.id,
                category: category.clone(),
                nearest_node_m: nearest,
                snap_distance_m: config.snap_distance_m,
            }),
        }
    }

    tracing::info!(
        path = %path.display(),
        category = %category,
        snapped = facilities.len(),
        unsnapped = warnings.len(),
        "facilities loaded"
    );
    Ok((facilities, warnings))
}

struct RawFacility {
    id: FacilityId,
    name: Option<String>,
    lon: f64,
    lat: f64,
}

fn read_geojson_points(
    path: &Path,
    category: &FacilityCategory,
) -> Result<Vec<RawFacility>, IngestError> {
    let features = vector::read_features(path)?;
    let mut out = Vec::new();
    for (index, feature) in features.iter().enumerate() {
        // Category attribute, when present, acts as a filter
        if let Some(attr) = vector::prop_str(feature, &["category", "amenity"]) {
            if !attr.eq_ignore_ascii_case(category.as_str()) {
                continue;
            }
        }
        let Some(geo::Geometry::Point(p)) = vector::to_geometry(feature) else {
            tracing::debug!(feature = index, "skipping non-point facility feature");
            continue;
        };
        let id = vector::prop_str(feature, &["id", "facility_id", "osm_id"])
            .unwrap_or_else(|| format!("{}#{index}", path.display()));
        out.push(RawFacility {
            id: FacilityId::new(id),
            name: vector::prop_str(feature, &["name", "NAME"]),
            lon: p.x(),
            lat: p.y(),
        });
    }
    Ok(out)
}

fn read_csv_points(
    path: &Path,
    category: &FacilityCategory,
) -> Result<Vec<RawFacility>, IngestError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| match e.kind() {
        csv::ErrorKind::Io(_) => IngestError::DataSource {
            path: path.to_path_buf(),
            source: std::io::Error::other(e.to_string()),
        },
        _ => IngestError::malformed(path, e.to_string()),
    })?;

    let headers = reader
        .headers()
        .map_err(|e| IngestError::malformed(path, e.to_string()))?
        .clone();
    let find = |candidates: &[&str]| {
        headers
            .iter()
            .position(|h| candidates.iter().any(|c| h.eq_ignore_ascii_case(c)))
    };
    let lon_col = find(LON_COLUMNS).ok_or_else(|| {
        IngestError::malformed(path, "no longitude column (tried lon/longitude/lng/x)")
    })?;
    let lat_col = find(LAT_COLUMNS)
        .ok_or_else(|| IngestError::malformed(path, "no latitude column (tried lat/latitude/y)"))?;
    let id_col = find(&["id", "facility_id", "code"]);
    let name_col = find(&["name", "facility_name"]);
    let category_col = find(&["category", "amenity"]);

    let mut out = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| IngestError::malformed(path, e.to_string()))?;
        // Category column, when present, acts as a filter
        if let Some(attr) = category_col.and_then(|c| record.get(c)) {
            let attr = attr.trim();
            if !attr.is_empty() && !attr.eq_ignore_ascii_case(category.as_str()) {
                continue;
            }
        }
        let coords = record
            .get(lon_col)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .zip(record.get(lat_col).and_then(|v| v.trim().parse::<f64>().ok()));
        let Some((lon, lat)) = coords else {
            tracing::debug!(row = index, "skipping csv row without numeric coordinates");
            continue;
        };
        let id = id_col
            .and_then(|c| record.get(c))
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| format!("row{index}"), |v| v.trim().to_string());
        out.push(RawFacility {
            id: FacilityId::new(id),
            name: name_col
                .and_then(|c| record.get(c))
                .filter(|v| !v.trim().is_empty())
                .map(|v| v.trim().to_string()),
            lon,
            lat,
        });
    }
    Ok(out)
}
