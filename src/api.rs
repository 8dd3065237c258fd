//! JSON boundary for the attendance-recording workflow
//!
//! Field names follow the web client (`lat`, `lng`, `capturedAt`, ...).
//! Domain types stay snake_case and are converted at this edge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{GeofenceTarget, LocationSample, RejectionReason, ValidationOutcome};
use crate::validator::{
    self, LocationValidator, ValidatorConfig, default_max_average_accuracy_meters,
    default_max_spread_meters, default_required_samples,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSample {
    pub lat: f64,
    pub lng: f64,
    pub accuracy: f64,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTarget {
    pub lat: f64,
    pub lng: f64,
    pub radius_meters: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiValidatorConfig {
    #[serde(default = "default_required_samples")]
    pub required_samples: usize,
    #[serde(default = "default_max_spread_meters")]
    pub max_spread_meters: f64,
    #[serde(default = "default_max_average_accuracy_meters")]
    pub max_average_accuracy_meters: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub samples: Vec<ApiSample>,
    pub target: ApiTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ApiValidatorConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckInStatus {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInResponse {
    pub status: CheckInStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectionReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<ApiSample> for LocationSample {
    fn from(sample: ApiSample) -> Self {
        LocationSample::new(sample.lat, sample.lng, sample.accuracy, sample.captured_at)
    }
}

impl From<&LocationSample> for ApiSample {
    fn from(sample: &LocationSample) -> Self {
        Self {
            lat: sample.latitude,
            lng: sample.longitude,
            accuracy: sample.accuracy,
            captured_at: sample.captured_at,
        }
    }
}

impl From<ApiTarget> for GeofenceTarget {
    fn from(target: ApiTarget) -> Self {
        GeofenceTarget::new(target.lat, target.lng, target.radius_meters)
    }
}

impl From<ApiValidatorConfig> for ValidatorConfig {
    fn from(config: ApiValidatorConfig) -> Self {
        Self {
            required_samples: config.required_samples,
            max_spread_meters: config.max_spread_meters,
            max_average_accuracy_meters: config.max_average_accuracy_meters,
        }
    }
}

impl From<ValidationOutcome> for CheckInResponse {
    fn from(outcome: ValidationOutcome) -> Self {
        match outcome {
            ValidationOutcome::Accepted { .. } => Self {
                status: CheckInStatus::Accepted,
                reason: None,
                detail: None,
            },
            ValidationOutcome::Rejected { reason, detail } => Self {
                status: CheckInStatus::Rejected,
                reason: Some(reason),
                detail: Some(detail),
            },
        }
    }
}

impl CheckInRequest {
    /// Validate with the request's thresholds, or `defaults` where it has none
    pub fn evaluate_with(self, defaults: &ValidatorConfig) -> crate::Result<ValidationOutcome> {
        let config = self
            .config
            .map(ValidatorConfig::from)
            .unwrap_or_else(|| defaults.clone());
        let validator = LocationValidator::new(config)?;
        let samples = self.samples.into_iter().map(LocationSample::from).collect();
        validator.evaluate(samples, &self.target.into())
    }

    /// Validate with the request's thresholds, or the built-in defaults
    pub fn evaluate(self) -> crate::Result<ValidationOutcome> {
        self.evaluate_with(&ValidatorConfig::default())
    }
}

/// Decode a request, validate it and encode the response
pub fn evaluate_json(request: &str) -> crate::Result<String> {
    let request: CheckInRequest = serde_json::from_str(request)?;
    let response = CheckInResponse::from(request.evaluate()?);
    Ok(serde_json::to_string(&response)?)
}

/// Validate domain values and wrap the result for the wire
pub fn respond(
    samples: Vec<LocationSample>,
    target: &GeofenceTarget,
    config: &ValidatorConfig,
) -> crate::Result<CheckInResponse> {
    validator::validate(samples, target, config).map(CheckInResponse::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PresenceGuardError;

    const ACCEPTED_REQUEST: &str = r#"{
        "samples": [
            {"lat": -6.30103, "lng": 106.652, "accuracy": 15, "capturedAt": "2026-01-20T08:00:00Z"},
            {"lat": -6.301, "lng": 106.65204, "accuracy": 15, "capturedAt": "2026-01-20T08:00:01Z"},
            {"lat": -6.30098, "lng": 106.65202, "accuracy": 15, "capturedAt": "2026-01-20T08:00:02Z"}
        ],
        "target": {"lat": -6.301, "lng": 106.652, "radiusMeters": 50}
    }"#;

    #[test]
    fn test_accepted_response_omits_reason() {
        let response = evaluate_json(ACCEPTED_REQUEST).unwrap();
        assert_eq!(response, r#"{"status":"accepted"}"#);
    }

    #[test]
    fn test_partial_config_takes_defaults() {
        let mut request: CheckInRequest = serde_json::from_str(ACCEPTED_REQUEST).unwrap();
        request.config = Some(serde_json::from_str(r#"{"maxAverageAccuracyMeters": 10}"#).unwrap());
        let config = ValidatorConfig::from(request.config.clone().unwrap());
        assert_eq!(config.required_samples, 3);
        assert_eq!(config.max_spread_meters, 50.0);

        let response = CheckInResponse::from(request.evaluate().unwrap());
        assert_eq!(response.status, CheckInStatus::Rejected);
        assert_eq!(response.reason, Some(RejectionReason::LowAccuracy));
    }

    #[test]
    fn test_rejected_response_shape() {
        let response = CheckInResponse::from(ValidationOutcome::Rejected {
            reason: RejectionReason::InconsistentSpread,
            detail: "samples are up to 120.00 m apart (max 50.00 m)".to_string(),
        });
        let json: serde_json::Value = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["reason"], "inconsistent_spread");
        assert!(json["detail"].as_str().unwrap().contains("120.00"));
    }

    #[test]
    fn test_malformed_json_is_a_serialization_error() {
        let err = evaluate_json(r#"{"samples": "#).unwrap_err();
        assert!(matches!(err, PresenceGuardError::Serialization { .. }));
    }

    #[test]
    fn test_too_few_samples_is_invalid_configuration() {
        let request = r#"{
            "samples": [{"lat": 0, "lng": 0, "accuracy": 5, "capturedAt": "2026-01-20T08:00:00Z"}],
            "target": {"lat": 0, "lng": 0, "radiusMeters": 50}
        }"#;
        let err = evaluate_json(request).unwrap_err();
        assert!(matches!(err, PresenceGuardError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_sample_round_trip_through_wire_type() {
        let request: CheckInRequest = serde_json::from_str(ACCEPTED_REQUEST).unwrap();
        let sample = LocationSample::from(request.samples[0].clone());
        let wire = ApiSample::from(&sample);
        assert_eq!(wire.lat, -6.30103);
        assert_eq!(wire.captured_at, sample.captured_at);
    }
}
