//! Invariant-checked record types
//!
//! The pipeline's entities, validated at construction rather than at
//! use. All geometry is in the run's projected metric CRS.

use crate::error::ModelError;
use crate::ids::{FacilityCategory, FacilityId, UnitId};
use geo::{Centroid, MultiPolygon, Point, Polygon};
use serde::{Deserialize, Serialize};

/// Reference to a node of the road graph (arena index)
///
/// Only the graph crate mints these, so a `NodeRef` held by a facility
/// is always a node of the graph it was snapped against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeRef(u32);

impl NodeRef {
    /// Wrap an arena index
    #[inline]
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The arena index
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A service facility snapped to the road graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    /// External identifier
    pub id: FacilityId,
    /// Human-readable name, when the source provides one
    pub name: Option<String>,
    /// Service category
    pub category: FacilityCategory,
    /// Location in the metric CRS
    pub point: Point<f64>,
    /// Nearest road-graph node within the snap distance
    pub node: NodeRef,
    /// Distance from `point` to the snapped node, meters
    pub snap_distance_m: f64,
}

/// One population grid cell (or vector polygon fragment)
#[derive(Debug, Clone)]
pub struct PopulationCell {
    /// Cell footprint in the metric CRS
    pub polygon: Polygon<f64>,
    /// Cached centroid of the footprint
    pub centroid: Point<f64>,
    /// Population count, non-negative
    pub population: f64,
}

impl PopulationCell {
    /// Build a cell, validating the population count
    ///
    /// # Errors
    /// Returns [`ModelError::NegativePopulation`] for counts below zero
    /// and [`ModelError::InvalidCoordinate`] when the footprint has no
    /// centroid (empty/degenerate polygon).
    pub fn new(polygon: Polygon<f64>, population: f64) -> Result<Self, ModelError> {
        if !population.is_finite() || population < 0.0 {
            return Err(ModelError::NegativePopulation {
                context: "population cell".to_string(),
                value: population,
            });
        }
        let centroid = polygon
            .centroid()
            .ok_or_else(|| ModelError::InvalidCoordinate {
                crs: "metric".to_string(),
                x: f64::NAN,
                y: f64::NAN,
            })?;
        Ok(Self {
            polygon,
            centroid,
            population,
        })
    }
}

/// An administrative reporting polygon (ward / sub-county)
#[derive(Debug, Clone)]
pub struct SpatialUnit {
    /// External unit code
    pub id: UnitId,
    /// Unit name
    pub name: String,
    /// Footprint in the metric CRS
    pub geometry: MultiPolygon<f64>,
}

impl SpatialUnit {
    /// Build a unit record
    #[must_use]
    pub fn new(id: UnitId, name: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        Self {
            id,
            name: name.into(),
            geometry,
        }
    }
}

/// Final output entity: coverage of one unit for one category at one
/// threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityRecord {
    /// Spatial unit code
    pub unit_id: UnitId,
    /// Facility category
    pub category: FacilityCategory,
    /// Travel-time threshold, minutes
    pub threshold_minutes: u32,
    /// Total population of the unit
    pub population_total: f64,
    /// Population within the threshold of at least one facility
    pub population_covered: f64,
    /// `population_covered / population_total`, in [0, 1]; zero for an
    /// unpopulated unit
    pub coverage_fraction: f64,
}

impl AccessibilityRecord {
    /// Tolerance absorbing floating-point accumulation error before the
    /// [0, 1] invariant is enforced
    const EPS: f64 = 1e-9;

    /// Build a record, deriving and validating the coverage fraction
    ///
    /// # Errors
    /// Returns [`ModelError`] when populations are negative or covered
    /// exceeds total beyond accumulation tolerance.
    pub fn new(
        unit_id: UnitId,
        category: FacilityCategory,
        threshold_minutes: u32,
        population_total: f64,
        population_covered: f64,
    ) -> Result<Self, ModelError> {
        if !population_total.is_finite() || population_total < 0.0 {
            return Err(ModelError::NegativePopulation {
                context: format!("unit {unit_id} total"),
                value: population_total,
            });
        }
        if !population_covered.is_finite() || population_covered < -Self::EPS {
            return Err(ModelError::NegativePopulation {
                context: format!("unit {unit_id} covered"),
                value: population_covered,
            });
        }
        if population_covered > population_total * (1.0 + Self::EPS) + Self::EPS {
            return Err(ModelError::CoveredExceedsTotal {
                unit: unit_id.to_string(),
                covered: population_covered,
                total: population_total,
            });
        }
        let covered = population_covered.clamp(0.0, population_total);
        let fraction = if population_total > 0.0 {
            (covered / population_total).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Ok(Self {
            unit_id,
            category,
            threshold_minutes,
            population_total,
            population_covered: covered,
            coverage_fraction: fraction,
        })
    }
}
