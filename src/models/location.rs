//! Location models for geolocation samples and check-in targets

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single reading reported by the device position sensor
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LocationSample {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Sensor-reported error radius in meters
    pub accuracy: f64,
    /// When the sensor produced the reading
    pub captured_at: DateTime<Utc>,
}

impl LocationSample {
    /// Create a new sample
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, accuracy: f64, captured_at: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
            captured_at,
        }
    }

    /// Format sample as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// The authoritative check-in point and its allowed radius
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeofenceTarget {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Maximum allowed distance from the point, in meters
    pub radius_meters: f64,
}

impl GeofenceTarget {
    /// Create a new target
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, radius_meters: f64) -> Self {
        Self {
            latitude,
            longitude,
            radius_meters,
        }
    }

    /// Format target as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Anything that carries a latitude/longitude pair
pub trait Coordinates {
    fn latitude(&self) -> f64;
    fn longitude(&self) -> f64;
}

impl Coordinates for LocationSample {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl Coordinates for GeofenceTarget {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl Coordinates for (f64, f64) {
    fn latitude(&self) -> f64 {
        self.0
    }

    fn longitude(&self) -> f64 {
        self.1
    }
}

/// True when both values lie within the valid degree ranges
pub(crate) fn coordinates_in_range(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}
