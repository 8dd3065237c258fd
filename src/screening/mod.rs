//! Advisory fraud screening
//!
//! These checks come from the server-side attendance flow and the fraud
//! service. They never change a [`crate::ValidationOutcome`]; they return
//! findings the caller may log, persist, or turn into a refusal of its own.

pub mod accuracy;
pub mod motion;
pub mod spoofing;
pub mod timing;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::models::{GeofenceTarget, LocationSample};

pub use accuracy::best_sample;
pub use motion::PriorCheckIn;

/// Kind of suspicious signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    SampleWindowExceeded,
    StaleSamples,
    InsufficientAccurateSamples,
    LocationJump,
    InconsistentSamples,
    KnownSpoofCoordinate,
    RapidRelocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Medium,
    High,
    Critical,
}

/// One advisory signal with its supporting numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningFinding {
    #[serde(rename = "alert_type")]
    pub kind: FindingKind,
    pub severity: Severity,
    pub description: String,
    pub evidence: Value,
}

impl ScreeningFinding {
    pub(crate) fn new<S: Into<String>>(
        kind: FindingKind,
        severity: Severity,
        description: S,
        evidence: Value,
    ) -> Self {
        Self {
            kind,
            severity,
            description: description.into(),
            evidence,
        }
    }
}

/// A coordinate commonly produced by mock-location tools or device defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpoofPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Thresholds for the screening checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningPolicy {
    /// Newest minus oldest sample must not exceed this
    #[serde(default = "default_sample_window_seconds")]
    pub sample_window_seconds: u32,
    /// Oldest sample must be at most this old at screening time
    #[serde(default = "default_max_sample_age_seconds")]
    pub max_sample_age_seconds: u32,
    /// Per-sample accuracy limit; the effective limit is min(cap, radius)
    #[serde(default = "default_accuracy_cap_meters")]
    pub accuracy_cap_meters: f64,
    /// Largest distance between consecutive samples
    #[serde(default = "default_max_jump_meters")]
    pub max_jump_meters: f64,
    /// Largest speed between consecutive samples
    #[serde(default = "default_max_speed_mps")]
    pub max_speed_mps: f64,
    /// Largest distance from the best sample to any other sample
    #[serde(default = "default_max_anchor_spread_meters")]
    pub max_anchor_spread_meters: f64,
    /// Largest plausible speed between two check-ins
    #[serde(default = "default_max_relocation_speed_mps")]
    pub max_relocation_speed_mps: f64,
    /// Relocation speeds above this are critical
    #[serde(default = "default_critical_relocation_speed_mps")]
    pub critical_relocation_speed_mps: f64,
    /// Only check-ins this recent are compared
    #[serde(default = "default_relocation_lookback_minutes")]
    pub relocation_lookback_minutes: u32,
    #[serde(default = "default_spoof_tolerance_degrees")]
    pub spoof_tolerance_degrees: f64,
    #[serde(default = "default_known_spoof_points")]
    pub known_spoof_points: Vec<SpoofPoint>,
}

pub(crate) fn default_sample_window_seconds() -> u32 {
    20
}

pub(crate) fn default_max_sample_age_seconds() -> u32 {
    60
}

pub(crate) fn default_accuracy_cap_meters() -> f64 {
    50.0
}

pub(crate) fn default_max_jump_meters() -> f64 {
    150.0
}

pub(crate) fn default_max_speed_mps() -> f64 {
    35.0
}

pub(crate) fn default_max_anchor_spread_meters() -> f64 {
    100.0
}

pub(crate) fn default_max_relocation_speed_mps() -> f64 {
    50.0
}

pub(crate) fn default_critical_relocation_speed_mps() -> f64 {
    100.0
}

pub(crate) fn default_relocation_lookback_minutes() -> u32 {
    60
}

pub(crate) fn default_spoof_tolerance_degrees() -> f64 {
    0.0001
}

pub(crate) fn default_known_spoof_points() -> Vec<SpoofPoint> {
    vec![
        // Null Island
        SpoofPoint {
            latitude: 0.0,
            longitude: 0.0,
        },
        // Jakarta city center, a common emulator default
        SpoofPoint {
            latitude: -6.2088,
            longitude: 106.8456,
        },
    ]
}

impl Default for ScreeningPolicy {
    fn default() -> Self {
        Self {
            sample_window_seconds: default_sample_window_seconds(),
            max_sample_age_seconds: default_max_sample_age_seconds(),
            accuracy_cap_meters: default_accuracy_cap_meters(),
            max_jump_meters: default_max_jump_meters(),
            max_speed_mps: default_max_speed_mps(),
            max_anchor_spread_meters: default_max_anchor_spread_meters(),
            max_relocation_speed_mps: default_max_relocation_speed_mps(),
            critical_relocation_speed_mps: default_critical_relocation_speed_mps(),
            relocation_lookback_minutes: default_relocation_lookback_minutes(),
            spoof_tolerance_degrees: default_spoof_tolerance_degrees(),
            known_spoof_points: default_known_spoof_points(),
        }
    }
}

/// Runs every screening check against one check-in attempt
#[derive(Debug, Clone, Default)]
pub struct Screener {
    policy: ScreeningPolicy,
}

impl Screener {
    #[must_use]
    pub fn new(policy: ScreeningPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> &ScreeningPolicy {
        &self.policy
    }

    /// Collect findings for `samples`.
    ///
    /// `previous` is the caller's last recorded check-in for the same person,
    /// if any. `now` is the screening time.
    #[must_use]
    pub fn screen(
        &self,
        samples: &[LocationSample],
        target: &GeofenceTarget,
        previous: Option<&PriorCheckIn>,
        now: DateTime<Utc>,
    ) -> Vec<ScreeningFinding> {
        let mut findings = Vec::new();

        findings.extend(timing::check_window(samples, &self.policy));
        findings.extend(timing::check_freshness(samples, now, &self.policy));
        findings.extend(accuracy::check_quorum(samples, target, &self.policy));
        findings.extend(motion::detect_jump(samples, &self.policy));

        if let Some(best) = best_sample(samples) {
            findings.extend(motion::check_anchor_spread(samples, best, &self.policy));
            findings.extend(spoofing::detect_known_spoof(best, &self.policy));
            if let Some(previous) = previous {
                findings.extend(motion::detect_relocation(previous, best, now, &self.policy));
            }
        }

        for finding in &findings {
            warn!(
                kind = ?finding.kind,
                severity = ?finding.severity,
                "{}",
                finding.description
            );
        }

        findings
    }
}

/// Samples ordered by capture time
pub(crate) fn chronological(samples: &[LocationSample]) -> Vec<&LocationSample> {
    let mut ordered: Vec<&LocationSample> = samples.iter().collect();
    ordered.sort_by_key(|s| s.captured_at);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(second: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 20, 8, 0, 0).unwrap() + Duration::seconds(second)
    }

    #[test]
    fn test_clean_attempt_has_no_findings() {
        let target = GeofenceTarget::new(-6.346, 106.6915, 100.0);
        let samples = vec![
            LocationSample::new(-6.34601, 106.69151, 8.0, at(0)),
            LocationSample::new(-6.34602, 106.69150, 9.0, at(2)),
            LocationSample::new(-6.34600, 106.69152, 7.0, at(4)),
        ];
        let findings = Screener::default().screen(&samples, &target, None, at(10));
        assert!(findings.is_empty(), "{findings:?}");
    }

    #[test]
    fn test_samples_far_from_best_reading_are_flagged() {
        let target = GeofenceTarget::new(-6.346, 106.6915, 200.0);
        // the best sample is ~111 m from the other two
        let samples = vec![
            LocationSample::new(-6.346, 106.6915, 5.0, at(0)),
            LocationSample::new(-6.347, 106.6915, 8.0, at(5)),
            LocationSample::new(-6.347, 106.6915, 9.0, at(10)),
        ];
        let findings = Screener::default().screen(&samples, &target, None, at(15));
        let kinds: Vec<FindingKind> = findings.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![FindingKind::InconsistentSamples]);
    }

    #[test]
    fn test_findings_serialize_with_alert_codes() {
        let finding = ScreeningFinding::new(
            FindingKind::RapidRelocation,
            Severity::Critical,
            "moved too fast",
            serde_json::json!({ "speed_mps": 120.0 }),
        );
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["alert_type"], "rapid_relocation");
        assert_eq!(json["severity"], "critical");
        assert_eq!(json["evidence"]["speed_mps"], 120.0);
    }

    #[test]
    fn test_spoofed_and_stale_attempt_reports_both() {
        let target = GeofenceTarget::new(-6.2088, 106.8456, 100.0);
        let samples = vec![
            LocationSample::new(-6.2088, 106.8456, 5.0, at(0)),
            LocationSample::new(-6.2088, 106.8456, 5.0, at(1)),
            LocationSample::new(-6.2088, 106.8456, 5.0, at(2)),
        ];
        let findings = Screener::default().screen(&samples, &target, None, at(300));
        let kinds: Vec<FindingKind> = findings.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![FindingKind::StaleSamples, FindingKind::KnownSpoofCoordinate]
        );
    }
}
