//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (rendered by the subscriber installed in `main`).

use log::{error, info, warn};

use crate::app::events::{AppEvent, CycleStep};
use crate::app::ports::EventSink;
use crate::app::reading::Reading;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::LifecycleChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::SerialRead(serial) => {
                info!("SENSOR | serial={}", serial);
            }
            AppEvent::CycleStarted { cycle } => {
                info!("CYCLE | #{} started", cycle);
            }
            AppEvent::DataNotReady => {
                info!("CYCLE | data not ready, skipping read");
            }
            AppEvent::Measured(r) => log_reading(r),
            AppEvent::MeasurementStopped => {
                info!("CYCLE | stopped measurement, sleeping");
            }
            AppEvent::PayloadBuilt(body) => {
                info!("REPORT | payload={}", body);
            }
            AppEvent::ResponseReceived { status, body } => {
                info!("REPORT | status={} | body={}", status, body);
            }
            AppEvent::ReportRejected { status, issues } => {
                for issue in issues {
                    warn!(
                        "REPORT | rejected ({}) | {}: {} [{}]",
                        status,
                        issue.location(),
                        issue.msg,
                        issue.kind
                    );
                }
            }
            AppEvent::CycleFailed { step, error } => match step {
                CycleStep::Stop => warn!("CYCLE | {}: {}", step_name(*step), error),
                _ => error!("CYCLE | {}: {}", step_name(*step), error),
            },
        }
    }
}

fn step_name(step: CycleStep) -> &'static str {
    match step {
        CycleStep::Start => "start-measurement",
        CycleStep::DataReady => "data-ready",
        CycleStep::Read => "read-measurement",
        CycleStep::Stop => "stop-measurement",
        CycleStep::Report => "post-measurement",
    }
}

/// Human-readable table of one reading.
fn log_reading(r: &Reading) {
    info!("PM | pm0.5 count: {:8.3}", r.number_pm0_5);
    info!(
        "PM | pm1   count: {:8.3} ug: {:6.3}",
        r.number_pm1_0, r.mass_pm1_0
    );
    info!(
        "PM | pm2.5 count: {:8.3} ug: {:6.3}",
        r.number_pm2_5, r.mass_pm2_5
    );
    info!(
        "PM | pm4   count: {:8.3} ug: {:6.3}",
        r.number_pm4_0, r.mass_pm4_0
    );
    info!(
        "PM | pm10  count: {:8.3} ug: {:6.3}",
        r.number_pm10, r.mass_pm10
    );
    info!("PM | pm_typ: {:4.3}", r.typical_particle_size);
}
