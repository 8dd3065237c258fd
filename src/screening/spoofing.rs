//! Known mock-location coordinates

use serde_json::json;

use super::{FindingKind, ScreeningFinding, ScreeningPolicy, Severity};
use crate::models::LocationSample;

/// Flag a sample sitting on a well-known mock-location coordinate
#[must_use]
pub fn detect_known_spoof(sample: &LocationSample, policy: &ScreeningPolicy) -> Option<ScreeningFinding> {
    let tolerance = policy.spoof_tolerance_degrees;
    let matched = policy.known_spoof_points.iter().find(|point| {
        (sample.latitude - point.latitude).abs() < tolerance
            && (sample.longitude - point.longitude).abs() < tolerance
    })?;

    Some(ScreeningFinding::new(
        FindingKind::KnownSpoofCoordinate,
        Severity::High,
        "Suspicious GPS coordinate detected (possible GPS spoofing)",
        json!({
            "latitude": sample.latitude,
            "longitude": sample.longitude,
            "matched_spoof_point": {
                "lat": matched.latitude,
                "lng": matched.longitude,
            },
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_null_island_is_flagged() {
        let sample = LocationSample::new(0.00005, -0.00002, 5.0, Utc::now());
        let finding = detect_known_spoof(&sample, &ScreeningPolicy::default()).unwrap();
        assert_eq!(finding.kind, FindingKind::KnownSpoofCoordinate);
        assert_eq!(finding.evidence["matched_spoof_point"]["lat"], 0.0);
    }

    #[test]
    fn test_nearby_real_location_is_not_flagged() {
        let sample = LocationSample::new(-6.2090, 106.8456, 5.0, Utc::now());
        assert!(detect_known_spoof(&sample, &ScreeningPolicy::default()).is_none());
    }
}
