//! Report building and delivery.
//!
//! A [`Reading`] plus the static metadata from [`Config`] becomes one
//! [`MeasurementReport`]. The wire format is a JSON array even though
//! exactly one record is ever sent.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{ReportError, Result};

use super::events::{AppEvent, ValidationIssue};
use super::ports::{EventSink, ReportPort};
use super::reading::Reading;

/// The outbound record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementReport {
    /// Model of the device
    pub sensor: String,
    /// Name used to identify the device
    pub source: String,
    /// User friendly name of the device
    pub description: String,
    /// PM1.0 [µg/m³], truncated
    pub pm1dot0: i32,
    /// PM2.5 [µg/m³], truncated
    pub pm2dot5: i32,
    /// PM10 [µg/m³], truncated
    pub pm10: i32,
    pub longitude: f32,
    pub latitude: f32,
    /// RFC 3339, UTC, nanosecond precision
    pub recorded: String,
}

impl MeasurementReport {
    /// Mass values are truncated toward zero, never rounded.
    pub fn new(reading: &Reading, config: &Config, recorded: DateTime<Utc>) -> Self {
        Self {
            sensor: config.sensor.clone(),
            source: config.source.clone(),
            description: config.description.clone(),
            pm1dot0: truncate(reading.mass_pm1_0),
            pm2dot5: truncate(reading.mass_pm2_5),
            pm10: truncate(reading.mass_pm10),
            longitude: config.longitude,
            latitude: config.latitude,
            recorded: recorded.to_rfc3339_opts(SecondsFormat::Nanos, true),
        }
    }
}

/// `as` saturates at the i32 bounds and maps NaN to 0.
fn truncate(mass: f32) -> i32 {
    mass.trunc() as i32
}

/// Body shape the endpoint uses for rejected payloads.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationResponse {
    #[serde(default)]
    pub detail: Vec<ValidationIssue>,
}

/// Serialise a single-element report array for `reading`.
pub fn build_payload(reading: &Reading, config: &Config, recorded: DateTime<Utc>) -> Result<String> {
    let reports = [MeasurementReport::new(reading, config, recorded)];
    serde_json::to_string(&reports).map_err(|e| ReportError::Serialize(e.to_string()).into())
}

/// Build, post and classify. The timestamp is taken here, at
/// serialisation time, not when the sensor was read.
///
/// Returns the HTTP status on 2xx. Any other status is an error; the
/// response body is logged either way.
pub async fn report<R, E>(reading: &Reading, config: &Config, reporter: &R, sink: &mut E) -> Result<u16>
where
    R: ReportPort,
    E: EventSink,
{
    let payload = build_payload(reading, config, Utc::now())?;
    sink.emit(&AppEvent::PayloadBuilt(payload.clone()));

    let response = reporter.send(payload).await?;
    sink.emit(&AppEvent::ResponseReceived {
        status: response.status,
        body: response.body.clone(),
    });

    if (200..300).contains(&response.status) {
        return Ok(response.status);
    }

    if let Ok(parsed) = serde_json::from_str::<ValidationResponse>(&response.body) {
        if !parsed.detail.is_empty() {
            sink.emit(&AppEvent::ReportRejected {
                status: response.status,
                issues: parsed.detail,
            });
        }
    }

    Err(ReportError::Status {
        status: response.status,
        body: response.body,
    }
    .into())
}
