//! Service configuration.
//!
//! Built once at startup from the process environment and passed
//! explicitly to the measurement cycle and the reporter. Every required
//! variable must be present and parsable; a missing or malformed value
//! aborts startup before any bus or network I/O happens.

use core::fmt;
use std::time::Duration;

use crate::error::ConfigError;

/// Default Linux I2C device node for the sensor bus.
pub const DEFAULT_I2C_DEVICE: &str = "/dev/i2c-1";
/// SPS30 fixed I2C address.
pub const DEFAULT_I2C_ADDRESS: u8 = 0x69;
/// Blind wait between starting a measurement and checking readiness.
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(2);
/// Whole-request timeout for the collection endpoint.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Immutable service configuration.
#[derive(Clone, PartialEq)]
pub struct Config {
    // --- Endpoint ---
    /// Collection endpoint (`URL`).
    pub url: String,
    /// Value of the `X-API-Key` header (`API_KEY`).
    pub api_key: String,
    /// Request timeout (`HTTP_TIMEOUT`, seconds, optional).
    pub http_timeout: Duration,

    // --- Report metadata ---
    /// Sensor model name (`SENSOR`).
    pub sensor: String,
    /// Device name (`SOURCE`).
    pub source: String,
    /// Human-friendly description (`DESCRIPTION`).
    pub description: String,
    /// Static latitude (`LAT`).
    pub latitude: f32,
    /// Static longitude (`LON`).
    pub longitude: f32,

    // --- Timing ---
    /// Time between cycles (`SLEEP`, seconds).
    pub interval: Duration,
    /// Settle delay inside a cycle (`SETTLE_MS`, optional).
    pub settle: Duration,

    // --- Bus ---
    /// I2C device node (`I2C_DEVICE`, optional).
    pub i2c_device: String,
    /// Sensor address (`I2C_ADDRESS`, optional).
    pub i2c_address: u8,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Required keys are resolved in a
    /// fixed order so the first missing one is the one reported.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let url = required("URL")?;
        let api_key = required("API_KEY")?;
        let sensor = required("SENSOR")?;
        let source = required("SOURCE")?;
        let description = required("DESCRIPTION")?;
        let latitude = parse_f32("LAT", &required("LAT")?)?;
        let longitude = parse_f32("LON", &required("LON")?)?;
        let interval = Duration::from_secs(parse_positive("SLEEP", &required("SLEEP")?)?);

        let settle = match lookup("SETTLE_MS") {
            Some(v) => Duration::from_millis(parse_u64("SETTLE_MS", &v)?),
            None => DEFAULT_SETTLE,
        };
        let http_timeout = match lookup("HTTP_TIMEOUT") {
            Some(v) => Duration::from_secs(parse_positive("HTTP_TIMEOUT", &v)?),
            None => DEFAULT_HTTP_TIMEOUT,
        };
        let i2c_device = lookup("I2C_DEVICE").unwrap_or_else(|| DEFAULT_I2C_DEVICE.into());
        let i2c_address = match lookup("I2C_ADDRESS") {
            Some(v) => parse_address(&v)?,
            None => DEFAULT_I2C_ADDRESS,
        };

        Ok(Self {
            url,
            api_key,
            http_timeout,
            sensor,
            source,
            description,
            latitude,
            longitude,
            interval,
            settle,
            i2c_device,
            i2c_address,
        })
    }
}

// The API key never reaches the logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("http_timeout", &self.http_timeout)
            .field("sensor", &self.sensor)
            .field("source", &self.source)
            .field("description", &self.description)
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .field("interval", &self.interval)
            .field("settle", &self.settle)
            .field("i2c_device", &self.i2c_device)
            .field("i2c_address", &format_args!("0x{:02X}", self.i2c_address))
            .finish()
    }
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_owned(),
    }
}

fn parse_f32(key: &'static str, value: &str) -> Result<f32, ConfigError> {
    match value.trim().parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(invalid(key, value)),
    }
}

fn parse_u64(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

fn parse_positive(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    match parse_u64(key, value)? {
        0 => Err(invalid(key, value)),
        v => Ok(v),
    }
}

/// Accepts `0x69` or `105`; must be a 7-bit address.
fn parse_address(value: &str) -> Result<u8, ConfigError> {
    let trimmed = value.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => trimmed.parse(),
    };
    match parsed {
        Ok(addr) if addr <= 0x7F => Ok(addr),
        _ => Err(invalid("I2C_ADDRESS", value)),
    }
}
