//! Input summaries
//!
//! `accessmap inspect <source>` prints the shape of a geospatial input
//! so a bad file surfaces before a full run: feature and geometry-type
//! counts plus bounding box for vector sources, grid dimensions for
//! rasters, row counts for CSV.

use amap_ingest::{vector, AsciiGrid};
use anyhow::Context;
use geo::BoundingRect;
use std::collections::BTreeMap;
use std::path::Path;

/// Print a summary of `path` to stdout
pub fn inspect(path: &Path) -> anyhow::Result<()> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("asc") => inspect_raster(path),
        Some("csv") => inspect_csv(path),
        _ => inspect_vector(path),
    }
}

fn inspect_raster(path: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let grid = AsciiGrid::parse(&text)
        .map_err(|reason| anyhow::anyhow!("{}: {reason}", path.display()))?;

    let mut populated = 0usize;
    let mut total = 0.0f64;
    for row in 0..grid.nrows {
        for col in 0..grid.ncols {
            let value = grid.value(row, col);
            if grid.nodata.is_some_and(|nd| (value - nd).abs() < f64::EPSILON) {
                continue;
            }
            if value > 0.0 {
                populated += 1;
                total += value;
            }
        }
    }

    println!("ESRI ASCII grid: {}", path.display());
    println!("  Size: {} x {} cells, {} m cell size", grid.ncols, grid.nrows, grid.cellsize);
    println!(
        "  Extent: x [{}, {}], y [{}, {}]",
        grid.xllcorner,
        grid.cellsize.mul_add(grid.ncols as f64, grid.xllcorner),
        grid.yllcorner,
        grid.cellsize.mul_add(grid.nrows as f64, grid.yllcorner),
    );
    match grid.nodata {
        Some(nodata) => println!("  Nodata: {nodata}"),
        None => println!("  Nodata: none declared"),
    }
    println!("  Populated cells: {populated}, total value {total:.1}");
    Ok(())
}

fn inspect_csv(path: &Path) -> anyhow::Result<()> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("reading headers of {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader.records().filter_map(Result::ok).count();

    println!("CSV table: {}", path.display());
    println!("  Columns: {}", headers.join(", "));
    println!("  Rows: {rows}");
    Ok(())
}

fn inspect_vector(path: &Path) -> anyhow::Result<()> {
    let features = vector::read_features(path)?;

    let mut kinds: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    for feature in &features {
        let Some(geometry) = vector::to_geometry(feature) else {
            *kinds.entry("none").or_default() += 1;
            continue;
        };
        *kinds.entry(kind_name(&geometry)).or_default() += 1;
        if let Some(rect) = geometry.bounding_rect() {
            bounds = Some(match bounds {
                None => (rect.min().x, rect.min().y, rect.max().x, rect.max().y),
                Some((min_x, min_y, max_x, max_y)) => (
                    min_x.min(rect.min().x),
                    min_y.min(rect.min().y),
                    max_x.max(rect.max().x),
                    max_y.max(rect.max().y),
                ),
            });
        }
    }

    println!("GeoJSON source: {}", path.display());
    println!("  Features: {}", features.len());
    for (kind, count) in &kinds {
        println!("    {kind}: {count}");
    }
    match bounds {
        Some((min_x, min_y, max_x, max_y)) => {
            println!("  Bounds: x [{min_x}, {max_x}], y [{min_y}, {max_y}]");
        }
        None => println!("  Bounds: no geometry"),
    }
    println!("  CRS: not declared in-file; pass --input-crs to `run` if not EPSG:4326");
    Ok(())
}

fn kind_name(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::Line(_) | geo::Geometry::LineString(_) => "LineString",
        geo::Geometry::MultiLineString(_) => "MultiLineString",
        geo::Geometry::Polygon(_) | geo::Geometry::Rect(_) | geo::Geometry::Triangle(_) => {
            "Polygon"
        }
        geo::Geometry::MultiPolygon(_) => "MultiPolygon",
        geo::Geometry::GeometryCollection(_) => "GeometryCollection",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn inspects_a_small_raster() {
        let mut file = tempfile::Builder::new().suffix(".asc").tempfile().unwrap();
        write!(
            file,
            "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 100\nNODATA_value -9999\n5 -9999\n0 12\n"
        )
        .unwrap();
        inspect(file.path()).unwrap();
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(inspect(Path::new("/nonexistent/input.geojson")).is_err());
    }
}
