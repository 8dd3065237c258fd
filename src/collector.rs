//! Sample collection state machine
//!
//! The sensor feed is external. It pushes readings into a [`SampleCollector`],
//! which moves through `Idle → Collecting → Validating → {Accepted, Rejected}`
//! and runs the validator exactly once when enough distinct samples arrived.

use std::time::Duration;

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::PresenceGuardError;
use crate::models::{GeofenceTarget, LocationSample, ValidationOutcome};
use crate::validator::LocationValidator;

/// Collector lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionState {
    Idle,
    Collecting,
    Validating,
    Accepted,
    Rejected,
}

impl CollectionState {
    /// True once an outcome has been produced
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, CollectionState::Accepted | CollectionState::Rejected)
    }
}

/// Accumulates samples for a single check-in attempt
#[derive(Debug)]
pub struct SampleCollector {
    target: GeofenceTarget,
    validator: LocationValidator,
    state: CollectionState,
    samples: Vec<LocationSample>,
    outcome: Option<ValidationOutcome>,
}

impl SampleCollector {
    #[must_use]
    pub fn new(target: GeofenceTarget, validator: LocationValidator) -> Self {
        Self {
            target,
            validator,
            state: CollectionState::Idle,
            samples: Vec::new(),
            outcome: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> CollectionState {
        self.state
    }

    #[must_use]
    pub fn samples(&self) -> &[LocationSample] {
        &self.samples
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&ValidationOutcome> {
        self.outcome.as_ref()
    }

    /// Collected/required ratio, capped at 1.0
    #[must_use]
    pub fn progress(&self) -> f64 {
        let required = self.validator.required_samples();
        (self.samples.len() as f64 / required as f64).min(1.0)
    }

    /// Begin a new attempt, discarding anything from a previous one
    pub fn start(&mut self) {
        self.samples.clear();
        self.outcome = None;
        self.state = CollectionState::Collecting;
        debug!(
            required = self.validator.required_samples(),
            "Started sample collection"
        );
    }

    /// Return to `Idle`
    pub fn reset(&mut self) {
        self.samples.clear();
        self.outcome = None;
        self.state = CollectionState::Idle;
    }

    /// Record a sensor reading.
    ///
    /// Readings sharing a timestamp with an earlier one are dropped. Once the
    /// required count is reached the batch is validated and the collector moves
    /// to `Accepted` or `Rejected`.
    pub fn record(&mut self, sample: LocationSample) -> crate::Result<CollectionState> {
        if self.state != CollectionState::Collecting {
            return Err(PresenceGuardError::collection(format!(
                "cannot record a sample while {:?}",
                self.state
            )));
        }

        if self
            .samples
            .iter()
            .any(|s| s.captured_at == sample.captured_at)
        {
            debug!(captured_at = %sample.captured_at, "Dropping duplicate sample");
            return Ok(self.state);
        }

        self.samples.push(sample);
        if self.samples.len() < self.validator.required_samples() {
            return Ok(self.state);
        }

        self.state = CollectionState::Validating;
        let batch = self.samples.clone();
        let outcome = match self.validator.evaluate(batch, &self.target) {
            Ok(outcome) => outcome,
            Err(e) => {
                // A malformed batch sends the collector back to Idle
                self.reset();
                return Err(e);
            }
        };

        self.state = if outcome.is_accepted() {
            CollectionState::Accepted
        } else {
            CollectionState::Rejected
        };
        info!(state = ?self.state, "Sample collection finished");
        self.outcome = Some(outcome);
        Ok(self.state)
    }

    /// Take the outcome out of a finished collector
    pub fn into_outcome(self) -> Option<ValidationOutcome> {
        self.outcome
    }
}

/// Drive a fresh collector from `feed` until it produces an outcome.
///
/// Fails with `CollectionTimeout` when `timeout` elapses first and with
/// `FeedClosed` when the feed ends early.
pub async fn collect_and_validate<S>(
    feed: S,
    target: GeofenceTarget,
    validator: LocationValidator,
    timeout: Duration,
) -> crate::Result<ValidationOutcome>
where
    S: Stream<Item = LocationSample> + Unpin,
{
    let required = validator.required_samples();
    let mut collector = SampleCollector::new(target, validator);
    collector.start();

    let drive = async {
        let mut feed = feed;
        while let Some(sample) = feed.next().await {
            if collector.record(sample)?.is_terminal() {
                return Ok(true);
            }
        }
        Ok::<bool, PresenceGuardError>(false)
    };

    let finished = tokio::time::timeout(timeout, drive).await;
    match finished {
        Ok(Ok(true)) => collector
            .into_outcome()
            .ok_or_else(|| PresenceGuardError::collection("collector finished without outcome")),
        Ok(Ok(false)) => {
            let collected = collector.samples().len();
            warn!(collected, required, "Sample feed closed early");
            Err(PresenceGuardError::FeedClosed {
                collected,
                required,
            })
        }
        Ok(Err(e)) => Err(e),
        Err(_) => {
            let collected = collector.samples().len();
            warn!(collected, required, "Sample collection timed out");
            Err(PresenceGuardError::CollectionTimeout {
                collected,
                required,
            })
        }
    }
}
