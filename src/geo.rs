//! Great-circle distance and sample-set geometry

use crate::models::{Coordinates, LocationSample};

/// Mean earth radius used by the haversine crate, in meters
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance in meters between two points given in degrees.
///
/// No range validation is done here; callers guarantee valid coordinates.
#[must_use]
pub fn distance_meters<A: Coordinates + ?Sized, B: Coordinates + ?Sized>(from: &A, to: &B) -> f64 {
    let kilometers = haversine::distance(
        haversine::Location {
            latitude: from.latitude(),
            longitude: from.longitude(),
        },
        haversine::Location {
            latitude: to.latitude(),
            longitude: to.longitude(),
        },
        haversine::Units::Kilometers,
    );
    kilometers * 1000.0
}

/// Largest distance over all unordered sample pairs; 0 for fewer than two samples.
#[must_use]
pub fn max_pairwise_spread(samples: &[LocationSample]) -> f64 {
    let mut max_distance = 0.0_f64;
    for (i, a) in samples.iter().enumerate() {
        for b in &samples[i + 1..] {
            max_distance = max_distance.max(distance_meters(a, b));
        }
    }
    max_distance
}

/// Largest distance from any sample to `anchor`
#[must_use]
pub fn max_distance_from<A: Coordinates + ?Sized>(samples: &[LocationSample], anchor: &A) -> f64 {
    samples
        .iter()
        .map(|sample| distance_meters(sample, anchor))
        .fold(0.0, f64::max)
}

/// Arithmetic mean of reported accuracy; 0 for an empty set
#[must_use]
pub fn mean_accuracy(samples: &[LocationSample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let total: f64 = samples.iter().map(|s| s.accuracy).sum();
    total / samples.len() as f64
}
