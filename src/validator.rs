//! Location integrity validator
//!
//! Decides whether a completed batch of samples is a genuine, stationary
//! presence at a check-in point. Checks run in a fixed order and the first
//! failing one determines the rejection reason:
//!
//! 1. geofence containment of every sample
//! 2. maximum pairwise spread between samples
//! 3. mean reported accuracy
//!
//! Malformed input is reported as [`PresenceGuardError::InvalidConfiguration`]
//! before any check runs.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::PresenceGuardError;
use crate::geo;
use crate::models::location::coordinates_in_range;
use crate::models::{GeofenceTarget, LocationSample, RejectionReason, ValidationOutcome};

/// Thresholds applied by the validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Minimum number of samples in a batch
    #[serde(default = "default_required_samples")]
    pub required_samples: usize,
    /// Largest allowed distance between any two samples, in meters
    #[serde(default = "default_max_spread_meters")]
    pub max_spread_meters: f64,
    /// Largest allowed mean accuracy, in meters
    #[serde(default = "default_max_average_accuracy_meters")]
    pub max_average_accuracy_meters: f64,
}

pub(crate) fn default_required_samples() -> usize {
    3
}

pub(crate) fn default_max_spread_meters() -> f64 {
    50.0
}

pub(crate) fn default_max_average_accuracy_meters() -> f64 {
    100.0
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            required_samples: default_required_samples(),
            max_spread_meters: default_max_spread_meters(),
            max_average_accuracy_meters: default_max_average_accuracy_meters(),
        }
    }
}

impl ValidatorConfig {
    /// Reject zero sample counts and negative or non-finite thresholds
    pub fn validate(&self) -> crate::Result<()> {
        if self.required_samples == 0 {
            return Err(PresenceGuardError::invalid_configuration(
                "required_samples must be at least 1",
            ));
        }
        check_threshold("max_spread_meters", self.max_spread_meters)?;
        check_threshold(
            "max_average_accuracy_meters",
            self.max_average_accuracy_meters,
        )?;
        Ok(())
    }
}

fn check_threshold(name: &str, value: f64) -> crate::Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PresenceGuardError::invalid_configuration(format!(
            "{name} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}

fn check_target(target: &GeofenceTarget) -> crate::Result<()> {
    if !coordinates_in_range(target.latitude, target.longitude) {
        return Err(PresenceGuardError::invalid_configuration(format!(
            "target coordinates ({}) are out of range",
            target.format_coordinates()
        )));
    }
    check_threshold("radius_meters", target.radius_meters)
}

fn check_samples(samples: &[LocationSample], required: usize) -> crate::Result<()> {
    if samples.is_empty() {
        return Err(PresenceGuardError::invalid_configuration(
            "sample list is empty",
        ));
    }
    if samples.len() < required {
        return Err(PresenceGuardError::invalid_configuration(format!(
            "{} samples supplied, {required} required",
            samples.len()
        )));
    }
    for (index, sample) in samples.iter().enumerate() {
        if !coordinates_in_range(sample.latitude, sample.longitude) {
            return Err(PresenceGuardError::invalid_configuration(format!(
                "sample {index} has out-of-range coordinates ({})",
                sample.format_coordinates()
            )));
        }
        if !sample.accuracy.is_finite() || sample.accuracy < 0.0 {
            return Err(PresenceGuardError::invalid_configuration(format!(
                "sample {index} has invalid accuracy {}",
                sample.accuracy
            )));
        }
    }
    Ok(())
}

/// Validator bound to a checked configuration
#[derive(Debug, Clone)]
pub struct LocationValidator {
    config: ValidatorConfig,
}

impl LocationValidator {
    /// Create a validator, rejecting a malformed configuration
    pub fn new(config: ValidatorConfig) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    #[must_use]
    pub fn required_samples(&self) -> usize {
        self.config.required_samples
    }

    /// Validate a completed batch against `target`.
    ///
    /// Returns `Err` only for malformed input; every well-formed batch gets an
    /// [`ValidationOutcome`].
    #[tracing::instrument(
        name = "validate_samples",
        level = "debug",
        skip_all,
        fields(samples = samples.len(), radius = target.radius_meters)
    )]
    pub fn evaluate(
        &self,
        samples: Vec<LocationSample>,
        target: &GeofenceTarget,
    ) -> crate::Result<ValidationOutcome> {
        check_target(target)?;
        check_samples(&samples, self.config.required_samples)?;

        // 1) Geofence containment
        for (index, sample) in samples.iter().enumerate() {
            let distance = geo::distance_meters(sample, target);
            if distance > target.radius_meters {
                info!(index, distance, "Sample outside geofence");
                return Ok(ValidationOutcome::rejected(
                    RejectionReason::OutOfGeofence,
                    format!(
                        "sample {index} is {distance:.2} m from target (radius {:.2} m)",
                        target.radius_meters
                    ),
                ));
            }
        }
        debug!("All samples inside geofence");

        // 2) Spread consistency
        let spread = geo::max_pairwise_spread(&samples);
        if spread > self.config.max_spread_meters {
            info!(spread, "Sample spread too large");
            return Ok(ValidationOutcome::rejected(
                RejectionReason::InconsistentSpread,
                format!(
                    "samples are up to {spread:.2} m apart (max {:.2} m)",
                    self.config.max_spread_meters
                ),
            ));
        }
        debug!(spread, "Spread within limit");

        // 3) Accuracy
        let average_accuracy = geo::mean_accuracy(&samples);
        if average_accuracy > self.config.max_average_accuracy_meters {
            info!(average_accuracy, "Average accuracy too low");
            return Ok(ValidationOutcome::rejected(
                RejectionReason::LowAccuracy,
                format!(
                    "average accuracy is {average_accuracy:.2} m (max {:.2} m)",
                    self.config.max_average_accuracy_meters
                ),
            ));
        }

        info!(spread, average_accuracy, "Location samples accepted");
        Ok(ValidationOutcome::Accepted { samples })
    }
}

/// Validate `samples` against `target` with the given thresholds
pub fn validate(
    samples: Vec<LocationSample>,
    target: &GeofenceTarget,
    config: &ValidatorConfig,
) -> crate::Result<ValidationOutcome> {
    LocationValidator::new(config.clone())?.evaluate(samples, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rstest::rstest;

    const TARGET_LAT: f64 = -6.301;
    const TARGET_LNG: f64 = 106.652;

    fn target(radius: f64) -> GeofenceTarget {
        GeofenceTarget::new(TARGET_LAT, TARGET_LNG, radius)
    }

    /// Samples offset from the target by (dlat, dlng) degrees, one second apart
    fn samples(offsets: &[(f64, f64)], accuracy: f64) -> Vec<LocationSample> {
        let start = Utc.with_ymd_and_hms(2026, 1, 20, 8, 0, 0).unwrap();
        offsets
            .iter()
            .enumerate()
            .map(|(i, (dlat, dlng))| {
                LocationSample::new(
                    TARGET_LAT + dlat,
                    TARGET_LNG + dlng,
                    accuracy,
                    start + Duration::seconds(i as i64),
                )
            })
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = ValidatorConfig::default();
        assert_eq!(config.required_samples, 3);
        assert_eq!(config.max_spread_meters, 50.0);
        assert_eq!(config.max_average_accuracy_meters, 100.0);
    }

    #[test]
    fn test_accepts_stationary_samples() {
        let batch = samples(&[(0.00003, 0.0), (0.0, 0.00004), (-0.00002, 0.00002)], 15.0);
        let outcome = validate(batch.clone(), &target(50.0), &ValidatorConfig::default()).unwrap();
        assert_eq!(outcome, ValidationOutcome::Accepted { samples: batch });
    }

    #[test]
    fn test_geofence_detail_names_first_offender() {
        // second and third samples are both ~80 m out
        let batch = samples(&[(0.0, 0.0), (0.00072, 0.0), (0.00072, 0.0)], 15.0);
        let outcome = validate(batch, &target(50.0), &ValidatorConfig::default()).unwrap();
        match outcome {
            ValidationOutcome::Rejected { reason, detail } => {
                assert_eq!(reason, RejectionReason::OutOfGeofence);
                assert!(detail.starts_with("sample 1 is 80."), "{detail}");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_threshold_equality_passes() {
        let batch = samples(&[(0.0, 0.0), (0.0, 0.0), (0.0, 0.0)], 100.0);
        let outcome = validate(batch, &target(0.0), &ValidatorConfig::default()).unwrap();
        assert!(outcome.is_accepted());
    }

    #[test]
    fn test_single_sample_spread_is_vacuous() {
        let config = ValidatorConfig {
            required_samples: 1,
            max_spread_meters: 0.0,
            ..ValidatorConfig::default()
        };
        let outcome = validate(samples(&[(0.0, 0.0)], 5.0), &target(50.0), &config).unwrap();
        assert!(outcome.is_accepted());
    }

    #[rstest]
    #[case::empty(vec![], ValidatorConfig::default())]
    #[case::too_few(vec![(0.0, 0.0), (0.0, 0.0)], ValidatorConfig::default())]
    #[case::zero_required(vec![(0.0, 0.0)], ValidatorConfig { required_samples: 0, ..ValidatorConfig::default() })]
    #[case::negative_spread(vec![(0.0, 0.0); 3], ValidatorConfig { max_spread_meters: -1.0, ..ValidatorConfig::default() })]
    #[case::nan_accuracy_limit(vec![(0.0, 0.0); 3], ValidatorConfig { max_average_accuracy_meters: f64::NAN, ..ValidatorConfig::default() })]
    fn test_invalid_configuration(#[case] offsets: Vec<(f64, f64)>, #[case] config: ValidatorConfig) {
        let result = validate(samples(&offsets, 10.0), &target(50.0), &config);
        assert!(matches!(
            result,
            Err(PresenceGuardError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_negative_radius_is_invalid() {
        let result = validate(
            samples(&[(0.0, 0.0); 3], 10.0),
            &target(-5.0),
            &ValidatorConfig::default(),
        );
        assert!(matches!(
            result,
            Err(PresenceGuardError::InvalidConfiguration { .. })
        ));
    }

    #[rstest]
    #[case::latitude_out_of_range(GeofenceTarget::new(90.5, TARGET_LNG, 50.0))]
    #[case::longitude_out_of_range(GeofenceTarget::new(TARGET_LAT, -180.5, 50.0))]
    #[case::nan_latitude(GeofenceTarget::new(f64::NAN, TARGET_LNG, 50.0))]
    #[case::infinite_longitude(GeofenceTarget::new(TARGET_LAT, f64::INFINITY, 50.0))]
    #[case::nan_radius(GeofenceTarget::new(TARGET_LAT, TARGET_LNG, f64::NAN))]
    #[case::infinite_radius(GeofenceTarget::new(TARGET_LAT, TARGET_LNG, f64::INFINITY))]
    fn test_invalid_target(#[case] target: GeofenceTarget) {
        let result = validate(
            samples(&[(0.0, 0.0); 3], 10.0),
            &target,
            &ValidatorConfig::default(),
        );
        assert!(matches!(
            result,
            Err(PresenceGuardError::InvalidConfiguration { .. })
        ));
    }

    #[rstest]
    #[case::nan_latitude(f64::NAN, TARGET_LNG)]
    #[case::nan_longitude(TARGET_LAT, f64::NAN)]
    #[case::infinite_latitude(f64::NEG_INFINITY, TARGET_LNG)]
    fn test_non_finite_sample_is_invalid(#[case] latitude: f64, #[case] longitude: f64) {
        let mut batch = samples(&[(0.0, 0.0); 3], 10.0);
        batch[1].latitude = latitude;
        batch[1].longitude = longitude;
        let result = validate(batch, &target(50.0), &ValidatorConfig::default());
        assert!(matches!(
            result,
            Err(PresenceGuardError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_out_of_range_sample_is_invalid() {
        let mut batch = samples(&[(0.0, 0.0); 3], 10.0);
        batch[2].latitude = 91.0;
        let result = validate(batch, &target(50.0), &ValidatorConfig::default());
        assert!(matches!(
            result,
            Err(PresenceGuardError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_negative_accuracy_is_invalid() {
        let mut batch = samples(&[(0.0, 0.0); 3], 10.0);
        batch[0].accuracy = -1.0;
        let result = validate(batch, &target(50.0), &ValidatorConfig::default());
        assert!(matches!(
            result,
            Err(PresenceGuardError::InvalidConfiguration { .. })
        ));
    }
}
