//! `presence-guard` - location integrity checks for attendance check-ins
//!
//! This library decides whether a batch of device geolocation samples is a
//! genuine, stationary presence at a check-in point, and offers advisory
//! screening for common spoofing patterns.

pub mod api;
pub mod collector;
pub mod config;
pub mod error;
pub mod geo;
pub mod logging;
pub mod models;
pub mod screening;
pub mod validator;

// Re-export core types for public API
pub use api::{CheckInRequest, CheckInResponse, CheckInStatus, evaluate_json};
pub use collector::{CollectionState, SampleCollector, collect_and_validate};
pub use config::PresenceGuardConfig;
pub use error::PresenceGuardError;
pub use geo::distance_meters;
pub use models::{GeofenceTarget, LocationSample, RejectionReason, ValidationOutcome};
pub use screening::{FindingKind, PriorCheckIn, Screener, ScreeningFinding, ScreeningPolicy, Severity};
pub use validator::{LocationValidator, ValidatorConfig, validate};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, PresenceGuardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
