//! Population-to-unit assignment
//!
//! Distributes each population cell over the administrative units it
//! intersects. Areal mode weights by intersection area (a cell split
//! by a ward boundary contributes to both wards, proportionally);
//! centroid mode assigns the whole cell to the unit containing its
//! centroid. Units may overlap or leave gaps in dirty data: fractions
//! are normalized so one cell never contributes more than its whole
//! population, and cells landing in no unit are reported.

use amap_core::{LoadWarning, PopulationCell, SpatialUnit, WarningLog, Weighting};
use geo::{Area, BooleanOps, Contains, MultiPolygon};

/// Per-cell unit shares plus per-unit population totals
#[derive(Debug)]
pub struct UnitAssignment {
    /// For each cell, `(unit index, share of the cell's population)`
    cell_units: Vec<Vec<(usize, f64)>>,
    /// Total population per unit under the chosen weighting
    unit_totals: Vec<f64>,
}

impl UnitAssignment {
    /// Units (by index) receiving population from `cell`, with shares
    #[inline]
    #[must_use]
    pub fn shares(&self, cell: usize) -> &[(usize, f64)] {
        &self.cell_units[cell]
    }

    /// Total population assigned to unit `unit`
    #[inline]
    #[must_use]
    pub fn unit_total(&self, unit: usize) -> f64 {
        self.unit_totals[unit]
    }

    /// Population accounted to any unit
    #[must_use]
    pub fn assigned_total(&self) -> f64 {
        self.unit_totals.iter().sum()
    }
}

/// Compute the assignment of `cells` over `units`
#[must_use]
pub fn assign_population(
    cells: &[PopulationCell],
    units: &[SpatialUnit],
    weighting: Weighting,
    warnings: &mut WarningLog,
) -> UnitAssignment {
    let mut cell_units = Vec::with_capacity(cells.len());
    let mut unit_totals = vec![0.0; units.len()];

    for (cell_index, cell) in cells.iter().enumerate() {
        let mut shares = match weighting {
            Weighting::Areal => areal_shares(cell, units),
            Weighting::Centroid => centroid_shares(cell, units),
        };

        let total_share: f64 = shares.iter().map(|(_, s)| s).sum();
        if total_share <= 0.0 {
            if cell.population > 0.0 {
                warnings.push(LoadWarning::CellOutsideUnits {
                    cell_index,
                    population: cell.population,
                });
            }
            cell_units.push(Vec::new());
            continue;
        }
        // Overlapping units would double-count the cell; renormalize
        if total_share > 1.0 {
            for (_, share) in &mut shares {
                *share /= total_share;
            }
        }

        for &(unit, share) in &shares {
            unit_totals[unit] += cell.population * share;
        }
        cell_units.push(shares);
    }

    tracing::info!(
        cells = cells.len(),
        units = units.len(),
        assigned = unit_totals.iter().sum::<f64>(),
        "population assigned to units"
    );
    UnitAssignment {
        cell_units,
        unit_totals,
    }
}

fn areal_shares(cell: &PopulationCell, units: &[SpatialUnit]) -> Vec<(usize, f64)> {
    let cell_area = cell.polygon.unsigned_area();
    if cell_area <= 0.0 {
        return Vec::new();
    }
    let cell_multi = MultiPolygon::new(vec![cell.polygon.clone()]);
    let mut shares = Vec::new();
    for (unit_index, unit) in units.iter().enumerate() {
        let overlap = cell_multi.intersection(&unit.geometry).unsigned_area();
        if overlap > 0.0 {
            shares.push((unit_index, (overlap / cell_area).min(1.0)));
        }
    }
    shares
}

fn centroid_shares(cell: &PopulationCell, units: &[SpatialUnit]) -> Vec<(usize, f64)> {
    units
        .iter()
        .enumerate()
        .find(|(_, unit)| unit.geometry.contains(&cell.centroid))
        .map(|(unit_index, _)| vec![(unit_index, 1.0)])
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use amap_test_utils::{square_cell, square_unit};

    #[test]
    fn areal_splits_straddling_cell() {
        // Cell [0,100]x[0,100] split evenly by the boundary at x=50
        let cells = vec![square_cell(0.0, 0.0, 100.0, 80.0)];
        let units = vec![
            square_unit("A", -1000.0, -1000.0, 1050.0),
            square_unit("B", 50.0, -1000.0, 1050.0),
        ];
        let mut warnings = WarningLog::new();
        let a = assign_population(&cells, &units, Weighting::Areal, &mut warnings);
        assert!((a.unit_total(0) - 40.0).abs() < 1e-6);
        assert!((a.unit_total(1) - 40.0).abs() < 1e-6);
        assert!(warnings.is_empty());
    }

    #[test]
    fn centroid_assigns_whole_cell_once() {
        let cells = vec![square_cell(0.0, 0.0, 100.0, 80.0)];
        let units = vec![
            square_unit("A", -1000.0, -1000.0, 1049.0),
            square_unit("B", 49.0, -1000.0, 1050.0),
        ];
        let mut warnings = WarningLog::new();
        let a = assign_population(&cells, &units, Weighting::Centroid, &mut warnings);
        // Centroid (50, 50) falls in both; first match wins, no double count
        assert!((a.unit_total(0) + a.unit_total(1) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn cell_outside_all_units_is_reported() {
        let cells = vec![square_cell(10_000.0, 10_000.0, 100.0, 25.0)];
        let units = vec![square_unit("A", 0.0, 0.0, 1000.0)];
        let mut warnings = WarningLog::new();
        let a = assign_population(&cells, &units, Weighting::Areal, &mut warnings);
        assert_eq!(a.assigned_total(), 0.0);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings.as_slice()[0],
            LoadWarning::CellOutsideUnits { cell_index: 0, .. }
        ));
    }

    #[test]
    fn overlapping_units_never_double_count() {
        let cells = vec![square_cell(0.0, 0.0, 100.0, 60.0)];
        // Both units fully contain the cell
        let units = vec![
            square_unit("A", -500.0, -500.0, 2000.0),
            square_unit("B", -400.0, -400.0, 2000.0),
        ];
        let mut warnings = WarningLog::new();
        let a = assign_population(&cells, &units, Weighting::Areal, &mut warnings);
        assert!((a.assigned_total() - 60.0).abs() < 1e-6);
    }
}
