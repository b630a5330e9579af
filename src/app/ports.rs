//! Port traits: the hexagonal boundary between the cycle and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ run_cycle (domain)
//! ```
//!
//! Driven adapters (the SPS30 on the I2C bus, the HTTP endpoint, the log
//! output) implement these traits. The cycle consumes them via generics,
//! so the domain core never touches hardware or sockets directly.

use core::future::Future;

use crate::error::{ReportError, SensorError};

use super::events::AppEvent;
use super::reading::Reading;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Measurement control for a particulate-matter sensor.
///
/// Every call is a short bus transaction; none of them wait for the
/// sensor to finish measuring.
pub trait SensorPort {
    /// Leave idle mode and begin continuous measurement.
    fn start_measurement(&mut self) -> Result<(), SensorError>;

    /// Whether a completed measurement is buffered.
    fn is_data_ready(&mut self) -> Result<bool, SensorError>;

    /// Read the buffered measurement.
    fn read_measurement(&mut self) -> Result<Reading, SensorError>;

    /// Return to idle mode.
    fn stop_measurement(&mut self) -> Result<(), SensorError>;

    /// Device serial number (informational).
    fn read_serial(&mut self) -> Result<String, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Report port (driven adapter: domain → collection endpoint)
// ───────────────────────────────────────────────────────────────

/// Raw response from the collection endpoint, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResponse {
    pub status: u16,
    pub body: String,
}

/// Delivers one serialised payload to the collection endpoint.
///
/// Implementations perform exactly one attempt and return the response
/// as-is. Status classification is the caller's job.
pub trait ReportPort {
    fn send(
        &self,
        payload: String,
    ) -> impl Future<Output = Result<EndpointResponse, ReportError>> + Send;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
/// Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
