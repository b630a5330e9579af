//! Outbound application events.
//!
//! The cycle, the reporter and the lifecycle emit these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them.

use serde::Deserialize;

use crate::error::Error;
use crate::scheduler::LifecycleState;

use super::reading::Reading;

/// The step of a cycle that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStep {
    Start,
    DataReady,
    Read,
    Stop,
    Report,
}

/// One entry of the endpoint's validation-error body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidationIssue {
    /// Path to the offending field; mixes names and array indices.
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ValidationIssue {
    /// `loc` joined with dots, e.g. `body.0.pm10`.
    pub fn location(&self) -> String {
        self.loc
            .iter()
            .map(|part| match part {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service moved between lifecycle states.
    LifecycleChanged {
        from: LifecycleState,
        to: LifecycleState,
    },

    /// The sensor serial number was read at startup.
    SerialRead(String),

    /// A timer tick started cycle number `cycle`.
    CycleStarted { cycle: u64 },

    /// The readiness check came back negative; nothing is reported.
    DataNotReady,

    /// A measurement was read from the sensor.
    Measured(Reading),

    /// The sensor is back in idle mode.
    MeasurementStopped,

    /// The payload about to be posted.
    PayloadBuilt(String),

    /// The endpoint answered (any status).
    ResponseReceived { status: u16, body: String },

    /// The endpoint rejected the payload with structured validation errors.
    ReportRejected {
        status: u16,
        issues: Vec<ValidationIssue>,
    },

    /// A step of the cycle failed.
    CycleFailed { step: CycleStep, error: Error },
}
