//! Implausible movement between samples and between check-ins

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{FindingKind, ScreeningFinding, ScreeningPolicy, Severity, chronological};
use crate::geo;
use crate::models::{Coordinates, LocationSample};

/// Elapsed time between samples is floored here to keep speeds finite
const MIN_SAMPLE_INTERVAL_SECONDS: f64 = 0.2;

/// The caller's last recorded check-in for the same person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorCheckIn {
    pub latitude: f64,
    pub longitude: f64,
    pub checked_in_at: DateTime<Utc>,
}

impl Coordinates for PriorCheckIn {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Flag the first consecutive pair (by capture time) that moved too far or too fast
#[must_use]
pub fn detect_jump(samples: &[LocationSample], policy: &ScreeningPolicy) -> Option<ScreeningFinding> {
    let ordered = chronological(samples);

    ordered.windows(2).find_map(|pair| {
        let (previous, current) = (pair[0], pair[1]);
        let distance = geo::distance_meters(previous, current);
        let elapsed = (current.captured_at - previous.captured_at).num_milliseconds() as f64 / 1000.0;
        let seconds = elapsed.max(MIN_SAMPLE_INTERVAL_SECONDS);
        let speed = distance / seconds;

        if distance <= policy.max_jump_meters && speed <= policy.max_speed_mps {
            return None;
        }

        Some(ScreeningFinding::new(
            FindingKind::LocationJump,
            Severity::High,
            format!("Location jumped {distance:.2} m in {seconds:.2} s ({speed:.2} m/s)"),
            json!({
                "distance_meters": distance,
                "seconds": seconds,
                "speed_mps": speed,
            }),
        ))
    })
}

/// Flag a batch whose samples stray too far from `anchor`, normally the best sample
#[must_use]
pub fn check_anchor_spread(
    samples: &[LocationSample],
    anchor: &LocationSample,
    policy: &ScreeningPolicy,
) -> Option<ScreeningFinding> {
    let spread = geo::max_distance_from(samples, anchor);
    if spread <= policy.max_anchor_spread_meters {
        return None;
    }

    Some(ScreeningFinding::new(
        FindingKind::InconsistentSamples,
        Severity::Medium,
        format!(
            "Samples lie up to {spread:.2} m from the best reading (max {:.2} m)",
            policy.max_anchor_spread_meters
        ),
        json!({
            "spread_meters": spread,
            "max_spread_meters": policy.max_anchor_spread_meters,
            "anchor": { "lat": anchor.latitude, "lng": anchor.longitude },
        }),
    ))
}

/// Flag travel from `previous` to `current` faster than a person could move
#[must_use]
pub fn detect_relocation(
    previous: &PriorCheckIn,
    current: &LocationSample,
    now: DateTime<Utc>,
    policy: &ScreeningPolicy,
) -> Option<ScreeningFinding> {
    let lookback = Duration::minutes(i64::from(policy.relocation_lookback_minutes));
    if previous.checked_in_at < now - lookback {
        return None;
    }

    let elapsed = (current.captured_at - previous.checked_in_at).num_seconds();
    if elapsed <= 0 {
        return None;
    }

    let distance = geo::distance_meters(previous, current);
    let speed = distance / elapsed as f64;
    if speed <= policy.max_relocation_speed_mps {
        return None;
    }

    let severity = if speed > policy.critical_relocation_speed_mps {
        Severity::Critical
    } else {
        Severity::High
    };

    Some(ScreeningFinding::new(
        FindingKind::RapidRelocation,
        severity,
        format!(
            "Moved {:.1} km in {elapsed} s since the previous check-in ({speed:.1} m/s)",
            distance / 1000.0
        ),
        json!({
            "previous_location": {
                "lat": previous.latitude,
                "lng": previous.longitude,
                "time": previous.checked_in_at.to_rfc3339(),
            },
            "current_location": {
                "lat": current.latitude,
                "lng": current.longitude,
                "time": current.captured_at.to_rfc3339(),
            },
            "distance_meters": distance,
            "time_seconds": elapsed,
            "speed_mps": speed,
        }),
    ))
}
