//! Data models for presence-guard
//!
//! - Location: samples reported by the device and the check-in target
//! - Outcome: the validator's accept/reject decision

pub mod location;
pub mod outcome;

// Re-export all public types for convenient access
pub use location::{Coordinates, GeofenceTarget, LocationSample};
pub use outcome::{RejectionReason, ValidationOutcome};
