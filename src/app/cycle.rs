//! The measurement cycle: one start → settle → check → (read) → stop
//! sequence against the sensor, followed by the report hand-off.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ ReportPort
//!                 │       run_cycle        │
//!                 └───────────┬────────────┘
//!                             ▼
//!                         EventSink
//! ```
//!
//! Every error is emitted as [`AppEvent::CycleFailed`] and also returned,
//! so callers can count outcomes without re-logging them.

use log::debug;

use crate::config::Config;
use crate::error::{Error, Result};

use super::events::{AppEvent, CycleStep};
use super::ports::{EventSink, ReportPort, SensorPort};
use super::reading::Reading;
use super::report;

/// How a cycle ended when nothing failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A reading was taken and the endpoint accepted it.
    Reported { status: u16 },
    /// The sensor had no data ready; nothing was sent.
    Skipped,
}

/// Run one cycle to completion.
///
/// * `start_measurement` failing aborts immediately; the sensor is left as
///   the start call left it and stop is not attempted.
/// * After the settle delay readiness is checked exactly once.
/// * `stop_measurement` runs on every path past a successful start.
/// * A reading is reported even if the stop that followed it failed; the
///   stop error is still emitted.
pub async fn run_cycle<S, R, E>(
    cycle: u64,
    sensor: &mut S,
    reporter: &R,
    config: &Config,
    sink: &mut E,
) -> Result<CycleOutcome>
where
    S: SensorPort,
    R: ReportPort,
    E: EventSink,
{
    sink.emit(&AppEvent::CycleStarted { cycle });

    if let Err(e) = sensor.start_measurement() {
        return Err(fail(sink, CycleStep::Start, e.into()));
    }

    debug!("cycle {}: settling for {:?}", cycle, config.settle);
    tokio::time::sleep(config.settle).await;

    let sampled = sample(sensor, sink);

    let stopped = sensor.stop_measurement();
    match &stopped {
        Ok(()) => sink.emit(&AppEvent::MeasurementStopped),
        Err(e) => {
            fail(sink, CycleStep::Stop, e.clone().into());
        }
    }

    let reading = match sampled {
        Ok(Some(reading)) => reading,
        Ok(None) => {
            return match stopped {
                Ok(()) => Ok(CycleOutcome::Skipped),
                Err(e) => Err(e.into()),
            };
        }
        Err(e) => return Err(e),
    };

    sink.emit(&AppEvent::Measured(reading));

    match report::report(&reading, config, reporter, sink).await {
        Ok(status) => Ok(CycleOutcome::Reported { status }),
        Err(e) => Err(fail(sink, CycleStep::Report, e)),
    }
}

/// Readiness check plus the optional read. `Ok(None)` means not ready.
fn sample<S: SensorPort, E: EventSink>(sensor: &mut S, sink: &mut E) -> Result<Option<Reading>> {
    match sensor.is_data_ready() {
        Ok(true) => sensor
            .read_measurement()
            .map(Some)
            .map_err(|e| fail(sink, CycleStep::Read, e.into())),
        Ok(false) => {
            sink.emit(&AppEvent::DataNotReady);
            Ok(None)
        }
        Err(e) => Err(fail(sink, CycleStep::DataReady, e.into())),
    }
}

fn fail<E: EventSink>(sink: &mut E, step: CycleStep, error: Error) -> Error {
    sink.emit(&AppEvent::CycleFailed {
        step,
        error: error.clone(),
    });
    error
}
