//! PM reporter library.
//!
//! Samples a Sensirion SPS30 over I2C on a fixed interval and posts each
//! reading to an HTTP collection endpoint. Exposes the pure-logic modules
//! for integration testing; the binary in `main.rs` wires the Linux bus,
//! the HTTP client and the signal handling together.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod shutdown;
