//! Application core: the measurement cycle and report building.
//!
//! All interaction with the sensor, the network and the logs happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals or a live endpoint.

pub mod cycle;
pub mod events;
pub mod ports;
pub mod reading;
pub mod report;
