//! Travel-speed model
//!
//! Converts segment length into traversal time for the run's travel
//! mode. Walking uses one configured speed everywhere; driving uses a
//! road-class table keyed on the `highway` attribute with an explicit
//! `maxspeed` winning when the source provides one.

use amap_core::{RunConfig, TravelMode};

/// Driving speed defaults by road class, km/h
const DRIVE_SPEEDS_KMH: &[(&str, f64)] = &[
    ("motorway", 80.0),
    ("motorway_link", 60.0),
    ("trunk", 60.0),
    ("trunk_link", 50.0),
    ("primary", 50.0),
    ("primary_link", 40.0),
    ("secondary", 40.0),
    ("secondary_link", 35.0),
    ("tertiary", 35.0),
    ("tertiary_link", 30.0),
    ("residential", 25.0),
    ("living_street", 20.0),
    ("unclassified", 20.0),
    ("service", 15.0),
];

/// Fallback driving speed for unknown road classes, km/h
const DRIVE_FALLBACK_KMH: f64 = 30.0;

/// Edge travel-time assignment for one run
#[derive(Debug, Clone, Copy)]
pub struct SpeedModel {
    mode: TravelMode,
    walk_speed_kmh: f64,
}

impl SpeedModel {
    /// Model for the run's configured mode
    #[must_use]
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            mode: config.mode,
            walk_speed_kmh: config.walk_speed_kmh,
        }
    }

    /// Assumed speed for a segment, km/h
    #[must_use]
    pub fn speed_kmh(&self, highway: Option<&str>, maxspeed_kmh: Option<f64>) -> f64 {
        match self.mode {
            TravelMode::Walk => self.walk_speed_kmh,
            TravelMode::Drive => {
                if let Some(max) = maxspeed_kmh.filter(|v| v.is_finite() && *v > 0.0) {
                    return max;
                }
                highway
                    .and_then(|h| {
                        DRIVE_SPEEDS_KMH
                            .iter()
                            .find(|(class, _)| *class == h)
                            .map(|(_, kmh)| *kmh)
                    })
                    .unwrap_or(DRIVE_FALLBACK_KMH)
            }
        }
    }

    /// Traversal time for a segment, seconds
    #[must_use]
    pub fn travel_secs(&self, length_m: f64, highway: Option<&str>, maxspeed_kmh: Option<f64>) -> f64 {
        let kmh = self.speed_kmh(highway, maxspeed_kmh);
        (length_m / 1000.0) / kmh * 3600.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amap_core::RunConfig;

    fn model(mode: TravelMode) -> SpeedModel {
        SpeedModel::from_config(&RunConfig {
            mode,
            ..RunConfig::new()
        })
    }

    #[test]
    fn walking_ignores_road_class() {
        let m = model(TravelMode::Walk);
        assert_eq!(m.speed_kmh(Some("motorway"), None), 4.5);
        // 450 m at 4.5 km/h = 6 minutes
        assert!((m.travel_secs(450.0, None, None) - 360.0).abs() < 1e-9);
    }

    #[test]
    fn driving_uses_class_table_with_fallback() {
        let m = model(TravelMode::Drive);
        assert_eq!(m.speed_kmh(Some("primary"), None), 50.0);
        assert_eq!(m.speed_kmh(Some("goat_track"), None), 30.0);
        assert_eq!(m.speed_kmh(None, None), 30.0);
    }

    #[test]
    fn maxspeed_property_wins() {
        let m = model(TravelMode::Drive);
        assert_eq!(m.speed_kmh(Some("primary"), Some(80.0)), 80.0);
        // Invalid maxspeed falls back to the class table
        assert_eq!(m.speed_kmh(Some("primary"), Some(0.0)), 50.0);
    }
}
