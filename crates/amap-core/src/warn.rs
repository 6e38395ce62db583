//! Recoverable data-quality warnings
//!
//! Loader-stage problems affecting individual records are recovered by
//! exclusion, never silently: each exclusion is logged and accumulated
//! in a [`WarningLog`] that travels with the run's results and is
//! written into the run metadata. Only whole-source failures are fatal.

use crate::ids::{FacilityCategory, FacilityId};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// One recoverable finding from loading or aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadWarning {
    /// Facility farther than the snap distance from every graph node;
    /// excluded from its category's source set
    UnsnappedFacility {
        id: FacilityId,
        category: FacilityCategory,
        nearest_node_m: f64,
        snap_distance_m: f64,
    },
    /// Degenerate road segment (zero length or coincident endpoints);
    /// excluded from the graph
    DegenerateEdge { feature_index: usize, reason: String },
    /// Feature skipped because its geometry or attributes were unusable
    InvalidFeature {
        source: String,
        feature_index: usize,
        reason: String,
    },
    /// Negative population value clamped to zero
    NegativePopulation { source: String, value: f64 },
    /// Population cell intersecting no administrative unit; counted in
    /// no unit's totals
    CellOutsideUnits { cell_index: usize, population: f64 },
}

impl Display for LoadWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsnappedFacility {
                id,
                category,
                nearest_node_m,
                snap_distance_m,
            } => write!(
                f,
                "facility {id} ({category}) unsnapped: nearest node {nearest_node_m:.1}m away (limit {snap_distance_m:.1}m)"
            ),
            Self::DegenerateEdge {
                feature_index,
                reason,
            } => write!(f, "degenerate edge at feature {feature_index}: {reason}"),
            Self::InvalidFeature {
                source,
                feature_index,
                reason,
            } => write!(f, "invalid feature {feature_index} in {source}: {reason}"),
            Self::NegativePopulation { source, value } => {
                write!(f, "negative population {value} in {source} clamped to 0")
            }
            Self::CellOutsideUnits {
                cell_index,
                population,
            } => write!(
                f,
                "population cell {cell_index} ({population:.1} people) outside all units"
            ),
        }
    }
}

/// Accumulator for recoverable warnings across pipeline stages
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct WarningLog {
    warnings: Vec<LoadWarning>,
}

impl WarningLog {
    /// Empty log
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning (also emitted at `warn` level)
    pub fn push(&mut self, warning: LoadWarning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Absorb another log
    pub fn merge(&mut self, other: Self) {
        self.warnings.extend(other.warnings);
    }

    /// All accumulated warnings in arrival order
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Number of accumulated warnings
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    /// Whether the run was clean
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Unsnapped facilities only, for the caller-facing report
    #[must_use]
    pub fn unsnapped_facilities(&self) -> Vec<&LoadWarning> {
        self.warnings
            .iter()
            .filter(|w| matches!(w, LoadWarning::UnsnappedFacility { .. }))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn merge_preserves_order() {
        let mut a = WarningLog::new();
        a.push(LoadWarning::NegativePopulation {
            source: "pop.asc".to_string(),
            value: -3.0,
        });
        let mut b = WarningLog::new();
        b.push(LoadWarning::CellOutsideUnits {
            cell_index: 7,
            population: 12.0,
        });
        a.merge(b);
        assert_eq!(a.len(), 2);
        assert!(matches!(
            a.as_slice()[1],
            LoadWarning::CellOutsideUnits { cell_index: 7, .. }
        ));
    }

    #[test]
    fn unsnapped_filter() {
        let mut log = WarningLog::new();
        log.push(LoadWarning::UnsnappedFacility {
            id: FacilityId::new("f1"),
            category: FacilityCategory::new("clinic").unwrap(),
            nearest_node_m: 510.0,
            snap_distance_m: 150.0,
        });
        log.push(LoadWarning::DegenerateEdge {
            feature_index: 0,
            reason: "zero length".to_string(),
        });
        assert_eq!(log.unsnapped_facilities().len(), 1);
    }
}
