//! Accessibility aggregation
//!
//! Joins catchment arrival times with the population/unit assignment
//! into one [`AccessibilityRecord`] per (unit x category x threshold).
//!
//! Coverage of a population cell is evaluated against the road graph:
//! a location is covered when its nearest graph node arrived within
//! the threshold. Areal weighting samples a small point lattice inside
//! the cell so a cell straddling the catchment edge contributes
//! proportionally; centroid weighting is the binary fallback and is
//! flagged in the run metadata by the caller.

use crate::assign::UnitAssignment;
use crate::error::ReportError;
use amap_core::{
    AccessibilityRecord, PopulationCell, RunConfig, SpatialUnit, Weighting,
};
use amap_graph::{Catchment, NodeLocator};
use geo::{BoundingRect, Contains, Point};

/// Fraction of `cell` covered at `threshold_secs`
#[must_use]
pub fn cell_coverage_fraction(
    cell: &PopulationCell,
    catchment: &Catchment,
    threshold_secs: f64,
    locator: &NodeLocator,
    weighting: Weighting,
    samples_per_axis: u8,
) -> f64 {
    let covered_at = |point: Point<f64>| -> bool {
        locator
            .nearest(point)
            .is_some_and(|(node, _)| catchment.is_covered(node, threshold_secs))
    };

    match weighting {
        Weighting::Centroid => {
            if covered_at(cell.centroid) {
                1.0
            } else {
                0.0
            }
        }
        Weighting::Areal => {
            let Some(bounds) = cell.polygon.bounding_rect() else {
                return 0.0;
            };
            let n = usize::from(samples_per_axis.max(1));
            let width = bounds.max().x - bounds.min().x;
            let height = bounds.max().y - bounds.min().y;
            let mut inside = 0usize;
            let mut covered = 0usize;
            for iy in 0..n {
                for ix in 0..n {
                    #[allow(clippy::cast_precision_loss)]
                    let point = Point::new(
                        bounds.min().x + width * ((ix as f64 + 0.5) / n as f64),
                        bounds.min().y + height * ((iy as f64 + 0.5) / n as f64),
                    );
                    if !cell.polygon.contains(&point) {
                        continue;
                    }
                    inside += 1;
                    if covered_at(point) {
                        covered += 1;
                    }
                }
            }
            if inside == 0 {
                // Thin sliver the lattice missed; fall back to centroid
                return if covered_at(cell.centroid) { 1.0 } else { 0.0 };
            }
            #[allow(clippy::cast_precision_loss)]
            let fraction = covered as f64 / inside as f64;
            fraction
        }
    }
}

/// Build all accessibility records
///
/// Output order is deterministic: catchment order, then thresholds
/// ascending, then unit order; identical inputs produce identical
/// tables.
///
/// # Errors
/// Returns [`ReportError`] when a record violates its invariants.
pub fn aggregate(
    units: &[SpatialUnit],
    cells: &[PopulationCell],
    assignment: &UnitAssignment,
    catchments: &[Catchment],
    locator: &NodeLocator,
    config: &RunConfig,
) -> Result<Vec<AccessibilityRecord>, ReportError> {
    let mut records = Vec::with_capacity(units.len() * catchments.len() * config.thresholds_min.len());

    for catchment in catchments {
        for &threshold_min in &config.thresholds_min {
            let threshold_secs = f64::from(threshold_min) * 60.0;
            // One coverage evaluation per cell serves every unit
            let coverage: Vec<f64> = cells
                .iter()
                .map(|cell| {
                    cell_coverage_fraction(
                        cell,
                        catchment,
                        threshold_secs,
                        locator,
                        config.weighting,
                        config.areal_samples,
                    )
                })
                .collect();

            let mut covered_by_unit = vec![0.0; units.len()];
            for (cell_index, cell) in cells.iter().enumerate() {
                let cell_covered = cell.population * coverage[cell_index];
                if cell_covered == 0.0 {
                    continue;
                }
                for &(unit, share) in assignment.shares(cell_index) {
                    covered_by_unit[unit] += cell_covered * share;
                }
            }

            for (unit_index, unit) in units.iter().enumerate() {
                records.push(AccessibilityRecord::new(
                    unit.id.clone(),
                    catchment.category.clone(),
                    threshold_min,
                    assignment.unit_total(unit_index),
                    covered_by_unit[unit_index],
                )?);
            }
        }
    }

    tracing::info!(records = records.len(), "accessibility records aggregated");
    Ok(records)
}
