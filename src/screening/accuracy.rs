//! Per-sample accuracy quorum and best-sample selection

use std::cmp::Ordering;

use serde_json::json;

use super::{FindingKind, ScreeningFinding, ScreeningPolicy, Severity};
use crate::models::{GeofenceTarget, LocationSample};

/// Require at least half (rounded up) of the samples to meet `min(cap, radius)`
#[must_use]
pub fn check_quorum(
    samples: &[LocationSample],
    target: &GeofenceTarget,
    policy: &ScreeningPolicy,
) -> Option<ScreeningFinding> {
    if samples.is_empty() {
        return None;
    }

    let limit = policy.accuracy_cap_meters.min(target.radius_meters);
    let required = samples.len().div_ceil(2);
    let accurate = samples.iter().filter(|s| s.accuracy <= limit).count();
    if accurate >= required {
        return None;
    }

    Some(ScreeningFinding::new(
        FindingKind::InsufficientAccurateSamples,
        Severity::Medium,
        format!("Only {accurate} of {} samples within {limit:.0} m accuracy", samples.len()),
        json!({
            "accurate_samples": accurate,
            "required_samples": required,
            "accuracy_limit_meters": limit,
        }),
    ))
}

/// The most precise sample; ties go to the newest one
#[must_use]
pub fn best_sample(samples: &[LocationSample]) -> Option<&LocationSample> {
    samples.iter().min_by(|a, b| {
        a.accuracy
            .partial_cmp(&b.accuracy)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.captured_at.cmp(&a.captured_at))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn sample(accuracy: f64, second: i64) -> LocationSample {
        let base = Utc.with_ymd_and_hms(2026, 1, 20, 8, 0, 0).unwrap();
        LocationSample::new(-6.3, 106.6, accuracy, base + Duration::seconds(second))
    }

    #[test]
    fn test_quorum_met_with_half_rounded_up() {
        let target = GeofenceTarget::new(-6.3, 106.6, 100.0);
        let samples = vec![sample(10.0, 0), sample(40.0, 1), sample(90.0, 2)];
        assert!(check_quorum(&samples, &target, &ScreeningPolicy::default()).is_none());
    }

    #[test]
    fn test_quorum_uses_radius_when_smaller() {
        let target = GeofenceTarget::new(-6.3, 106.6, 20.0);
        let samples = vec![sample(10.0, 0), sample(40.0, 1), sample(45.0, 2)];
        let finding = check_quorum(&samples, &target, &ScreeningPolicy::default()).unwrap();
        assert_eq!(finding.kind, FindingKind::InsufficientAccurateSamples);
        assert_eq!(finding.evidence["accuracy_limit_meters"], 20.0);
        assert_eq!(finding.evidence["required_samples"], 2);
    }

    #[test]
    fn test_best_sample_prefers_accuracy_then_newest() {
        let samples = vec![sample(12.0, 0), sample(5.0, 1), sample(5.0, 2), sample(30.0, 3)];
        let best = best_sample(&samples).unwrap();
        assert_eq!(best, &samples[2]);
        assert!(best_sample(&[]).is_none());
    }
}
