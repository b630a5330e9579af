//! Unified error types for the PM reporter.
//!
//! A single `Error` enum that every subsystem converts into, so the tick
//! loop and the startup path handle failures the same way. Only
//! configuration errors (and bus-open failures) are fatal; everything else
//! is contained to the cycle that produced it.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the service funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required setting is missing or could not be parsed.
    Config(ConfigError),
    /// The sensor or the bus it sits on failed.
    Sensor(SensorError),
    /// The reading could not be delivered to the collection endpoint.
    Report(ReportError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Report(e) => write!(f, "report: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable not set.
    Missing(&'static str),
    /// Environment variable set but not parsable (or out of range).
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "env {key} not set"),
            Self::Invalid { key, value } => write!(f, "env {key} has invalid value {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorError {
    /// The I2C device node could not be opened.
    Open(String),
    /// Writing a command to the bus failed.
    BusWrite,
    /// Reading a response from the bus failed.
    BusRead,
    /// A response word failed its CRC-8 check.
    Crc,
    /// The serial number was not valid ASCII.
    InvalidSerial,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(msg) => write!(f, "open bus: {msg}"),
            Self::BusWrite => write!(f, "I2C write failed"),
            Self::BusRead => write!(f, "I2C read failed"),
            Self::Crc => write!(f, "CRC mismatch"),
            Self::InvalidSerial => write!(f, "serial number is not ASCII"),
        }
    }
}

impl std::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Report errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// The HTTP client could not be built.
    Client(String),
    /// The payload could not be serialised.
    Serialize(String),
    /// Network / transport failure (connect, timeout, body read).
    Transport(String),
    /// The endpoint answered with a non-2xx status.
    Status { status: u16, body: String },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client(msg) => write!(f, "HTTP client: {msg}"),
            Self::Serialize(msg) => write!(f, "serialise payload: {msg}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::Status { status, .. } => write!(f, "endpoint returned HTTP {status}"),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<ReportError> for Error {
    fn from(e: ReportError) -> Self {
        Self::Report(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
