//! Coordinate reference systems and reprojection
//!
//! All distance and area math in the pipeline happens in a projected
//! metric CRS; degrees are only valid at the input and output boundary.
//! Supported systems: WGS84 geographic (EPSG:4326) and the UTM zones
//! (EPSG:326xx north / 327xx south), converted with the standard
//! transverse-Mercator series on the WGS84 ellipsoid.

use crate::error::ModelError;
use geo::Point;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

// WGS84 ellipsoid
const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const UTM_K0: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// A coordinate reference system declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crs {
    /// Geographic lon/lat degrees (EPSG:4326)
    Wgs84,
    /// Universal Transverse Mercator, meters
    Utm {
        /// Zone number, 1..=60
        zone: u8,
        /// Southern-hemisphere variant (false northing applied)
        south: bool,
    },
}

impl Crs {
    /// The metric CRS of the original study area (UTM 37S, Kenya)
    pub const STUDY_DEFAULT: Self = Self::Utm {
        zone: 37,
        south: true,
    };

    /// Whether coordinates in this CRS are meters
    #[inline]
    #[must_use]
    pub fn is_projected(&self) -> bool {
        matches!(self, Self::Utm { .. })
    }

    /// EPSG code of this CRS
    #[must_use]
    pub fn epsg(&self) -> u32 {
        match self {
            Self::Wgs84 => 4326,
            Self::Utm { zone, south: false } => 32600 + u32::from(*zone),
            Self::Utm { zone, south: true } => 32700 + u32::from(*zone),
        }
    }
}

impl FromStr for Crs {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s
            .trim()
            .to_ascii_uppercase()
            .strip_prefix("EPSG:")
            .and_then(|c| c.parse::<u32>().ok())
            .ok_or_else(|| ModelError::UnsupportedCrs(s.to_string()))?;
        match code {
            4326 => Ok(Self::Wgs84),
            32601..=32660 => Ok(Self::Utm {
                zone: (code - 32600) as u8,
                south: false,
            }),
            32701..=32760 => Ok(Self::Utm {
                zone: (code - 32700) as u8,
                south: true,
            }),
            _ => Err(ModelError::UnsupportedCrs(s.to_string())),
        }
    }
}

impl Display for Crs {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// Projects WGS84 lon/lat into a target UTM zone and back
///
/// Immutable; shared freely across loaders. Accuracy of the series
/// expansion is sub-millimeter within the zone, which is far beyond the
/// needs of travel-time analysis.
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    zone: u8,
    south: bool,
}

impl Projector {
    /// Build a projector targeting `metric`
    ///
    /// # Errors
    /// Returns [`ModelError::UnsupportedCrs`] when `metric` is not a
    /// projected system.
    pub fn new(metric: Crs) -> Result<Self, ModelError> {
        match metric {
            Crs::Utm { zone, south } => Ok(Self { zone, south }),
            Crs::Wgs84 => Err(ModelError::UnsupportedCrs(
                "metric CRS must be projected, got EPSG:4326".to_string(),
            )),
        }
    }

    /// The target metric CRS
    #[inline]
    #[must_use]
    pub fn metric_crs(&self) -> Crs {
        Crs::Utm {
            zone: self.zone,
            south: self.south,
        }
    }

    fn central_meridian_deg(&self) -> f64 {
        f64::from(self.zone) * 6.0 - 183.0
    }

    /// Forward projection: lon/lat degrees -> easting/northing meters
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidCoordinate`] for out-of-range degrees.
    pub fn project(&self, lon: f64, lat: f64) -> Result<Point<f64>, ModelError> {
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(ModelError::InvalidCoordinate {
                crs: Crs::Wgs84.to_string(),
                x: lon,
                y: lat,
            });
        }
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let ep2 = e2 / (1.0 - e2);
        let phi = lat.to_radians();
        let lam = lon.to_radians();
        let lam0 = self.central_meridian_deg().to_radians();

        let sin_phi = phi.sin();
        let cos_phi = phi.cos();
        let n = WGS84_A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        let t = phi.tan().powi(2);
        let c = ep2 * cos_phi * cos_phi;
        let a = (lam - lam0) * cos_phi;

        let m = meridian_arc(phi, e2);

        let easting = UTM_K0
            * n
            * (a + (1.0 - t + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0)
            + UTM_FALSE_EASTING;
        let mut northing = UTM_K0
            * (m + n
                * phi.tan()
                * (a * a / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));
        if self.south {
            northing += UTM_FALSE_NORTHING_SOUTH;
        }
        Ok(Point::new(easting, northing))
    }

    /// Reproject a coordinate declared in `from` into this projector's
    /// metric CRS
    ///
    /// Geographic input is projected directly; input in another UTM
    /// zone goes through WGS84. Identity when `from` already matches.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidCoordinate`] for out-of-range
    /// geographic coordinates.
    pub fn reproject(&self, from: Crs, x: f64, y: f64) -> Result<Point<f64>, ModelError> {
        match from {
            Crs::Wgs84 => self.project(x, y),
            Crs::Utm { zone, south } if zone == self.zone && south == self.south => {
                Ok(Point::new(x, y))
            }
            Crs::Utm { zone, south } => {
                let other = Self { zone, south };
                let (lon, lat) = other.unproject(Point::new(x, y));
                self.project(lon, lat)
            }
        }
    }

    /// Inverse projection: easting/northing meters -> (lon, lat) degrees
    #[must_use]
    pub fn unproject(&self, point: Point<f64>) -> (f64, f64) {
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let ep2 = e2 / (1.0 - e2);
        let x = point.x() - UTM_FALSE_EASTING;
        let y = if self.south {
            point.y() - UTM_FALSE_NORTHING_SOUTH
        } else {
            point.y()
        };

        let m = y / UTM_K0;
        let mu = m
            / (WGS84_A
                * (1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2.powi(3) / 256.0));
        let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let sin_phi1 = phi1.sin();
        let cos_phi1 = phi1.cos();
        let c1 = ep2 * cos_phi1 * cos_phi1;
        let t1 = phi1.tan().powi(2);
        let n1 = WGS84_A / (1.0 - e2 * sin_phi1 * sin_phi1).sqrt();
        let r1 = WGS84_A * (1.0 - e2) / (1.0 - e2 * sin_phi1 * sin_phi1).powf(1.5);
        let d = x / (n1 * UTM_K0);

        let phi = phi1
            - (n1 * phi1.tan() / r1)
                * (d * d / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                        - 252.0 * ep2
                        - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);
        let lam = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                * d.powi(5)
                / 120.0)
            / cos_phi1;

        let lon = self.central_meridian_deg() + lam.to_degrees();
        let lat = phi.to_degrees();
        (lon, lat)
    }
}

/// Meridian arc length from the equator to latitude `phi`
fn meridian_arc(phi: f64, e2: f64) -> f64 {
    WGS84_A
        * ((1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2.powi(3) / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e2 * e2 / 32.0 + 45.0 * e2.powi(3) / 1024.0)
                * (2.0 * phi).sin()
            + (15.0 * e2 * e2 / 256.0 + 45.0 * e2.powi(3) / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e2.powi(3) / 3072.0) * (6.0 * phi).sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_epsg_codes() {
        assert_eq!("EPSG:4326".parse::<Crs>().unwrap(), Crs::Wgs84);
        assert_eq!(
            "epsg:32737".parse::<Crs>().unwrap(),
            Crs::Utm {
                zone: 37,
                south: true
            }
        );
        assert!("EPSG:3857".parse::<Crs>().is_err());
    }

    #[test]
    fn nairobi_roundtrip() {
        // Nairobi CBD, UTM 37S
        let proj = Projector::new(Crs::STUDY_DEFAULT).unwrap();
        let p = proj.project(36.8219, -1.2921).unwrap();
        // Known-good reference values for this point (sub-meter agreement)
        assert!((p.x() - 257_634.0).abs() < 100.0, "easting {}", p.x());
        assert!((p.y() - 9_857_080.0).abs() < 100.0, "northing {}", p.y());

        let (lon, lat) = proj.unproject(p);
        assert!((lon - 36.8219).abs() < 1e-6);
        assert!((lat + 1.2921).abs() < 1e-6);
    }

    #[test]
    fn projected_distances_are_metric() {
        // ~1.11 km per 0.01 degree of latitude
        let proj = Projector::new(Crs::STUDY_DEFAULT).unwrap();
        let a = proj.project(36.82, -1.29).unwrap();
        let b = proj.project(36.82, -1.28).unwrap();
        let d = (b.y() - a.y()).hypot(b.x() - a.x());
        assert!((d - 1_105.0).abs() < 15.0, "distance {d}");
    }

    #[test]
    fn rejects_degrees_out_of_range() {
        let proj = Projector::new(Crs::STUDY_DEFAULT).unwrap();
        assert!(proj.project(400.0, 0.0).is_err());
        assert!(proj.project(0.0, 95.0).is_err());
    }
}
