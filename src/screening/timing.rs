//! Sample window and freshness checks

use chrono::{DateTime, Utc};
use serde_json::json;

use super::{FindingKind, ScreeningFinding, ScreeningPolicy, Severity, chronological};
use crate::models::LocationSample;

/// Flag batches whose samples were spread over too long a period
#[must_use]
pub fn check_window(samples: &[LocationSample], policy: &ScreeningPolicy) -> Option<ScreeningFinding> {
    let ordered = chronological(samples);
    let (oldest, newest) = (ordered.first()?, ordered.last()?);

    let span = (newest.captured_at - oldest.captured_at).num_milliseconds() as f64 / 1000.0;
    if span <= f64::from(policy.sample_window_seconds) {
        return None;
    }

    Some(ScreeningFinding::new(
        FindingKind::SampleWindowExceeded,
        Severity::Medium,
        format!(
            "Samples span {span:.1} s, more than the {} s window",
            policy.sample_window_seconds
        ),
        json!({
            "span_seconds": span,
            "window_seconds": policy.sample_window_seconds,
        }),
    ))
}

/// Flag batches whose oldest sample is too old at screening time
#[must_use]
pub fn check_freshness(
    samples: &[LocationSample],
    now: DateTime<Utc>,
    policy: &ScreeningPolicy,
) -> Option<ScreeningFinding> {
    let oldest = chronological(samples).first().copied()?;

    let age = (now - oldest.captured_at).num_milliseconds() as f64 / 1000.0;
    if age <= f64::from(policy.max_sample_age_seconds) {
        return None;
    }

    Some(ScreeningFinding::new(
        FindingKind::StaleSamples,
        Severity::Medium,
        format!("Oldest sample is {age:.1} s old"),
        json!({
            "age_seconds": age,
            "max_age_seconds": policy.max_sample_age_seconds,
            "oldest_captured_at": oldest.captured_at.to_rfc3339(),
        }),
    ))
}
