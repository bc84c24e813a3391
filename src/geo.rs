//! Geographic primitives and great-circle math.
//!
//! Every containment decision in the dispatch core reduces to one
//! question: how far is a GPS fix from a zone center? Distances use the
//! Haversine formula with a mean Earth radius of 6371 km, which is
//! accurate to well under a meter at geofence scale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius in meters, per the Haversine convention.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("GPS accuracy {0} must be non-negative")]
    NegativeAccuracy(f64),
    #[error("geofence radius {0} must be positive")]
    NonPositiveRadius(f64),
}

/// A WGS-84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !(-90.0..=90.0).contains(&latitude) || !latitude.is_finite() {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) || !longitude.is_finite() {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// One reading from the device location provider. The core never owns
/// the provider; it is handed the latest fix (or nothing) per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    pub point: GeoPoint,
    pub accuracy_meters: f64,
    pub recorded_at: DateTime<Utc>,
}

impl GpsFix {
    pub fn new(
        point: GeoPoint,
        accuracy_meters: f64,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self, GeoError> {
        if accuracy_meters < 0.0 || !accuracy_meters.is_finite() {
            return Err(GeoError::NegativeAccuracy(accuracy_meters));
        }
        Ok(Self {
            point,
            accuracy_meters,
            recorded_at,
        })
    }
}

/// Circular approved zone around a site or yard. Immutable once
/// attached to a task; provisioning happens upstream of this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeofenceZone {
    center: GeoPoint,
    radius_meters: f64,
    label: String,
}

impl GeofenceZone {
    pub fn new(center: GeoPoint, radius_meters: f64, label: impl Into<String>) -> Result<Self, GeoError> {
        if radius_meters <= 0.0 || !radius_meters.is_finite() {
            return Err(GeoError::NonPositiveRadius(radius_meters));
        }
        Ok(Self {
            center,
            radius_meters,
            label: label.into(),
        })
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn radius_meters(&self) -> f64 {
        self.radius_meters
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Containment test with an inclusive boundary: a point sitting
    /// exactly on the radius is inside. Returns the measured distance
    /// alongside the flag so callers never compute it twice.
    pub fn contains(&self, point: GeoPoint) -> (bool, f64) {
        let distance = distance_meters(point, self.center);
        (distance <= self.radius_meters, distance)
    }
}

/// Great-circle distance between two points, in meters.
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (dlon / 2.0).sin().powi(2);
    // Float error can push h a hair past 1.0 for near-antipodal pairs,
    // which would send asin to NaN.
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = point(1.30, 103.80);
        let b = point(1.35, 103.95);
        assert_eq!(distance_meters(a, b), distance_meters(b, a));
    }

    #[test]
    fn test_distance_identical_points_is_zero() {
        let a = point(1.30, 103.80);
        assert_eq!(distance_meters(a, a), 0.0);
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        // One degree of latitude on a 6371 km sphere is ~111.195 km.
        let d = distance_meters(point(0.0, 0.0), point(1.0, 0.0));
        assert!((d - 111_194.9).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_antipodal_points_do_not_produce_nan() {
        let d = distance_meters(point(0.0, 0.0), point(0.0, 180.0));
        assert!(d.is_finite());
        // Half the circumference of the 6371 km sphere.
        assert!((d - 20_015_086.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn test_containment_boundary_is_inclusive() {
        let center = point(1.30, 103.80);
        let edge = point(1.3045, 103.80);
        let d = distance_meters(edge, center);
        // Radius set to the exact measured distance must still contain.
        let zone = GeofenceZone::new(center, d, "boundary").unwrap();
        let (within, reported) = zone.contains(edge);
        assert!(within);
        assert_eq!(reported, d);
    }

    #[test]
    fn test_containment_outside_radius() {
        let center = point(1.30, 103.80);
        let zone = GeofenceZone::new(center, 100.0, "site").unwrap();
        let (within, distance) = zone.contains(point(1.3045, 103.80));
        assert!(!within);
        assert!((distance - 500.4).abs() < 5.0, "got {distance}");
    }

    #[test]
    fn test_geo_point_rejects_out_of_range() {
        assert!(GeoPoint::new(90.1, 0.0).is_err());
        assert!(GeoPoint::new(-91.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, 180.5).is_err());
        assert!(GeoPoint::new(0.0, f64::NAN).is_err());
        assert!(GeoPoint::new(90.0, -180.0).is_ok());
    }

    #[test]
    fn test_gps_fix_rejects_negative_accuracy() {
        let p = point(1.30, 103.80);
        assert!(GpsFix::new(p, -1.0, Utc::now()).is_err());
        assert!(GpsFix::new(p, 0.0, Utc::now()).is_ok());
    }

    #[test]
    fn test_geofence_zone_rejects_non_positive_radius() {
        let p = point(1.30, 103.80);
        assert!(GeofenceZone::new(p, 0.0, "bad").is_err());
        assert!(GeofenceZone::new(p, -5.0, "bad").is_err());
    }
}
