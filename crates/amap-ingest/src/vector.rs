//! GeoJSON reading and reprojection helpers
//!
//! Shared by every vector loader: feature extraction, tolerant property
//! access (sources disagree on casing and types), and coordinate
//! reprojection into the run's metric CRS.

use crate::error::IngestError;
use amap_core::{Crs, ModelError, Projector};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{Feature, GeoJson};
use std::path::Path;

/// Read a GeoJSON file into its features
///
/// Accepts a `FeatureCollection`, a single `Feature`, or a bare
/// geometry (wrapped into one property-less feature).
///
/// # Errors
/// Fatal [`IngestError`] when the file is unreadable or not GeoJSON.
pub fn read_features(path: &Path) -> Result<Vec<Feature>, IngestError> {
    let contents = std::fs::read_to_string(path).map_err(|source| IngestError::DataSource {
        path: path.to_path_buf(),
        source,
    })?;
    let geojson: GeoJson = contents
        .parse()
        .map_err(|e| IngestError::malformed(path, format!("not valid GeoJSON: {e}")))?;
    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(g) => vec![Feature {
            bbox: None,
            geometry: Some(g),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    };
    tracing::info!(path = %path.display(), features = features.len(), "geojson loaded");
    Ok(features)
}

/// Feature geometry converted to `geo` types, when present and convertible
#[must_use]
pub fn to_geometry(feature: &Feature) -> Option<geo::Geometry<f64>> {
    feature
        .geometry
        .as_ref()
        .and_then(|g| geo::Geometry::<f64>::try_from(&g.value).ok())
}

/// First matching string property (string value, first element of an
/// array, or a number rendered as text)
#[must_use]
pub fn prop_str(feature: &Feature, keys: &[&str]) -> Option<String> {
    for key in keys {
        match feature.property(key) {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
                return Some(s.trim().to_string())
            }
            Some(serde_json::Value::Array(items)) => {
                if let Some(serde_json::Value::String(s)) = items.first() {
                    return Some(s.trim().to_string());
                }
            }
            Some(serde_json::Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

/// First matching numeric property (number, or leading number in a
/// string such as `"50 km/h"`)
#[must_use]
pub fn prop_f64(feature: &Feature, keys: &[&str]) -> Option<f64> {
    for key in keys {
        match feature.property(key) {
            Some(serde_json::Value::Number(n)) => return n.as_f64(),
            Some(serde_json::Value::String(s)) => {
                let digits: String = s
                    .trim()
                    .chars()
                    .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                    .collect();
                if let Ok(v) = digits.parse::<f64>() {
                    return Some(v);
                }
            }
            _ => {}
        }
    }
    None
}

/// First matching boolean-ish property (`true`, `"yes"`, `1`, ...)
#[must_use]
pub fn prop_bool(feature: &Feature, keys: &[&str]) -> Option<bool> {
    for key in keys {
        match feature.property(key) {
            Some(serde_json::Value::Bool(b)) => return Some(*b),
            Some(serde_json::Value::String(s)) => {
                return Some(matches!(
                    s.trim().to_ascii_lowercase().as_str(),
                    "yes" | "true" | "1"
                ))
            }
            Some(serde_json::Value::Number(n)) => return Some(n.as_f64() == Some(1.0)),
            _ => {}
        }
    }
    None
}

fn reproject_coord(
    coord: Coord<f64>,
    from: Crs,
    projector: &Projector,
) -> Result<Coord<f64>, ModelError> {
    let point = projector.reproject(from, coord.x, coord.y)?;
    Ok(Coord {
        x: point.x(),
        y: point.y(),
    })
}

/// Reproject a line string into the metric CRS
///
/// # Errors
/// Propagates [`ModelError::InvalidCoordinate`] from any vertex.
pub fn reproject_line(
    line: &LineString<f64>,
    from: Crs,
    projector: &Projector,
) -> Result<LineString<f64>, ModelError> {
    line.coords()
        .map(|&c| reproject_coord(c, from, projector))
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}

/// Reproject a polygon into the metric CRS
///
/// # Errors
/// Propagates [`ModelError::InvalidCoordinate`] from any vertex.
pub fn reproject_polygon(
    polygon: &Polygon<f64>,
    from: Crs,
    projector: &Projector,
) -> Result<Polygon<f64>, ModelError> {
    let exterior = reproject_line(polygon.exterior(), from, projector)?;
    let interiors = polygon
        .interiors()
        .iter()
        .map(|ring| reproject_line(ring, from, projector))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Reproject a multipolygon into the metric CRS
///
/// # Errors
/// Propagates [`ModelError::InvalidCoordinate`] from any vertex.
pub fn reproject_multipolygon(
    multi: &MultiPolygon<f64>,
    from: Crs,
    projector: &Projector,
) -> Result<MultiPolygon<f64>, ModelError> {
    multi
        .0
        .iter()
        .map(|p| reproject_polygon(p, from, projector))
        .collect::<Result<Vec<_>, _>>()
        .map(MultiPolygon::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::JsonObject;

    fn feature_with(props: serde_json::Value) -> Feature {
        let map: JsonObject = props.as_object().cloned().unwrap_or_default();
        Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: Some(map),
            foreign_members: None,
        }
    }

    #[test]
    fn prop_str_takes_first_array_element() {
        let f = feature_with(serde_json::json!({"highway": ["primary", "secondary"]}));
        assert_eq!(prop_str(&f, &["highway"]).as_deref(), Some("primary"));
    }

    #[test]
    fn prop_f64_parses_units_suffix() {
        let f = feature_with(serde_json::json!({"maxspeed": "50 km/h"}));
        assert_eq!(prop_f64(&f, &["maxspeed"]), Some(50.0));
    }

    #[test]
    fn prop_bool_accepts_osm_yes() {
        let f = feature_with(serde_json::json!({"oneway": "yes"}));
        assert_eq!(prop_bool(&f, &["oneway"]), Some(true));
    }

    #[test]
    fn prop_lookup_falls_through_keys() {
        let f = feature_with(serde_json::json!({"NAME": "Westlands"}));
        assert_eq!(prop_str(&f, &["name", "NAME"]).as_deref(), Some("Westlands"));
    }
}
