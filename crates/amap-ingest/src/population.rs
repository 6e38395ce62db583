//! Population loaders
//!
//! Two source shapes produce the same [`PopulationCell`] stream:
//! - ESRI ASCII grid rasters (`.asc`): one cell per positive-valued
//!   grid entry, with the cell footprint reprojected to the metric CRS
//! - GeoJSON polygons carrying a population attribute
//!
//! Negative values are clamped to zero (reported, not silently fixed),
//! mirroring the original pipeline's raster clean-up step.

use crate::error::IngestError;
use crate::vector;
use amap_core::{Crs, LoadWarning, PopulationCell, Projector, WarningLog};
use geo::{polygon, Area, Polygon};
use std::path::Path;

/// Parsed ESRI ASCII grid
///
/// Header keys are case-insensitive; values are row-major with the
/// first row at the top of the grid (north).
#[derive(Debug, Clone)]
pub struct AsciiGrid {
    pub ncols: usize,
    pub nrows: usize,
    pub xllcorner: f64,
    pub yllcorner: f64,
    pub cellsize: f64,
    pub nodata: Option<f64>,
    values: Vec<f64>,
}

impl AsciiGrid {
    /// Parse grid text
    ///
    /// # Errors
    /// Returns a description of the first structural problem.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut tokens = text.split_whitespace().peekable();
        let mut ncols = None;
        let mut nrows = None;
        let mut xllcorner = None;
        let mut yllcorner = None;
        let mut cellsize = None;
        let mut nodata = None;

        // Header: key/value pairs until the first bare number
        while let Some(&token) = tokens.peek() {
            if token.parse::<f64>().is_ok() {
                break;
            }
            let key = token.to_ascii_lowercase();
            tokens.next();
            let value: f64 = tokens
                .next()
                .ok_or_else(|| format!("header key '{key}' without value"))?
                .parse()
                .map_err(|_| format!("non-numeric value for header key '{key}'"))?;
            match key.as_str() {
                "ncols" => ncols = Some(value as usize),
                "nrows" => nrows = Some(value as usize),
                "xllcorner" => xllcorner = Some(value),
                "yllcorner" => yllcorner = Some(value),
                "cellsize" => cellsize = Some(value),
                "nodata_value" => nodata = Some(value),
                other => return Err(format!("unknown header key '{other}'")),
            }
        }

        let ncols = ncols.ok_or("missing ncols")?;
        let nrows = nrows.ok_or("missing nrows")?;
        let cellsize = cellsize.ok_or("missing cellsize")?;
        if ncols == 0 || nrows == 0 || cellsize <= 0.0 {
            return Err(format!(
                "degenerate grid: {ncols}x{nrows}, cellsize {cellsize}"
            ));
        }

        let values: Vec<f64> = tokens
            .map(|t| t.parse::<f64>().map_err(|_| format!("bad cell value '{t}'")))
            .collect::<Result<_, _>>()?;
        if values.len() != ncols * nrows {
            return Err(format!(
                "expected {} cell values, found {}",
                ncols * nrows,
                values.len()
            ));
        }

        Ok(Self {
            ncols,
            nrows,
            xllcorner: xllcorner.ok_or("missing xllcorner")?,
            yllcorner: yllcorner.ok_or("missing yllcorner")?,
            cellsize,
            nodata,
            values,
        })
    }

    /// Value at `(row, col)`, row 0 at the top
    #[inline]
    #[must_use]
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.ncols + col]
    }

    /// Footprint of cell `(row, col)` in the grid's own CRS
    #[must_use]
    pub fn cell_polygon(&self, row: usize, col: usize) -> Polygon<f64> {
        #[allow(clippy::cast_precision_loss)]
        let x0 = self.xllcorner + col as f64 * self.cellsize;
        #[allow(clippy::cast_precision_loss)]
        let y0 = self.yllcorner + (self.nrows - 1 - row) as f64 * self.cellsize;
        let s = self.cellsize;
        polygon![
            (x: x0, y: y0),
            (x: x0 + s, y: y0),
            (x: x0 + s, y: y0 + s),
            (x: x0, y: y0 + s),
        ]
    }
}

/// Load population cells from an ESRI ASCII grid raster
///
/// # Errors
/// Returns [`IngestError`] when the file is unreadable or structurally
/// invalid.
pub fn load_population_raster(
    path: &Path,
    declared_crs: Crs,
    projector: &Projector,
) -> Result<(Vec<PopulationCell>, WarningLog), IngestError> {
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::DataSource {
        path: path.to_path_buf(),
        source,
    })?;
    let grid = AsciiGrid::parse(&text).map_err(|reason| IngestError::malformed(path, reason))?;

    let mut cells = Vec::new();
    let mut warnings = WarningLog::new();
    let mut negative_sum = 0.0;

    for row in 0..grid.nrows {
        for col in 0..grid.ncols {
            let value = grid.value(row, col);
            if grid.nodata.is_some_and(|nd| (value - nd).abs() < f64::EPSILON) {
                continue;
            }
            if value < 0.0 {
                negative_sum += value;
                continue; // clamped to zero: nothing to count
            }
            if value == 0.0 {
                continue;
            }
            let footprint =
                vector::reproject_polygon(&grid.cell_polygon(row, col), declared_crs, projector)
                    .map_err(|e| IngestError::CrsMismatch {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    })?;
            cells.push(PopulationCell::new(footprint, value)?);
        }
    }

    if negative_sum < 0.0 {
        warnings.push(LoadWarning::NegativePopulation {
            source: path.display().to_string(),
            value: negative_sum,
        });
    }
    tracing::info!(
        path = %path.display(),
        grid = format!("{}x{}", grid.ncols, grid.nrows),
        cells = cells.len(),
        "population raster loaded"
    );
    Ok((cells, warnings))
}

/// Recognized population attribute names
const POP_KEYS: &[&str] = &["pop", "population", "POP", "pop_count"];

/// Load population cells from GeoJSON polygons
///
/// A multipolygon's population is split across its parts in proportion
/// to area, so downstream area weighting stays consistent.
///
/// # Errors
/// Returns [`IngestError`] on whole-source failure.
pub fn load_population_vector(
    path: &Path,
    declared_crs: Crs,
    projector: &Projector,
) -> Result<(Vec<PopulationCell>, WarningLog), IngestError> {
    let features = vector::read_features(path)?;
    let mut cells = Vec::new();
    let mut warnings = WarningLog::new();

    for (index, feature) in features.iter().enumerate() {
        let Some(population) = vector::prop_f64(feature, POP_KEYS) else {
            warnings.push(LoadWarning::InvalidFeature {
                source: path.display().to_string(),
                feature_index: index,
                reason: "no population attribute".to_string(),
            });
            continue;
        };
        let population = if population < 0.0 {
            warnings.push(LoadWarning::NegativePopulation {
                source: path.display().to_string(),
                value: population,
            });
            0.0
        } else {
            population
        };

        let polygons = match vector::to_geometry(feature) {
            Some(geo::Geometry::Polygon(p)) => vec![p],
            Some(geo::Geometry::MultiPolygon(mp)) => mp.0,
            Some(_) | None => {
                warnings.push(LoadWarning::InvalidFeature {
                    source: path.display().to_string(),
                    feature_index: index,
                    reason: "geometry is not a polygon".to_string(),
                });
                continue;
            }
        };

        let projected: Vec<Polygon<f64>> = polygons
            .iter()
            .map(|p| vector::reproject_polygon(p, declared_crs, projector))
            .collect::<Result<_, _>>()
            .map_err(|e| IngestError::CrsMismatch {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let total_area: f64 = projected.iter().map(Area::unsigned_area).sum();
        if total_area <= 0.0 {
            warnings.push(LoadWarning::InvalidFeature {
                source: path.display().to_string(),
                feature_index: index,
                reason: "zero-area polygon".to_string(),
            });
            continue;
        }
        for part in projected {
            let share = part.unsigned_area() / total_area;
            cells.push(PopulationCell::new(part, population * share)?);
        }
    }

    tracing::info!(
        path = %path.display(),
        cells = cells.len(),
        "population polygons loaded"
    );
    Ok((cells, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID: &str = "\
ncols 3
nrows 2
xllcorner 100.0
yllcorner 200.0
cellsize 10.0
NODATA_value -9999
1 0 -9999
4 -2 6
";

    #[test]
    fn parses_header_and_values() {
        let grid = AsciiGrid::parse(GRID).unwrap();
        assert_eq!(grid.ncols, 3);
        assert_eq!(grid.nrows, 2);
        assert_eq!(grid.value(0, 0), 1.0);
        assert_eq!(grid.value(1, 2), 6.0);
        assert_eq!(grid.nodata, Some(-9999.0));
    }

    #[test]
    fn top_row_is_northmost() {
        let grid = AsciiGrid::parse(GRID).unwrap();
        // Row 0 (top) sits one cell above the lower-left corner
        let top_left = grid.cell_polygon(0, 0);
        let bottom_left = grid.cell_polygon(1, 0);
        let top_y = top_left.exterior().0[0].y;
        let bottom_y = bottom_left.exterior().0[0].y;
        assert!((bottom_y - 200.0).abs() < 1e-9);
        assert!((top_y - 210.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_truncated_grid() {
        let text = "ncols 3\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3 4";
        assert!(AsciiGrid::parse(text).is_err());
    }
}
