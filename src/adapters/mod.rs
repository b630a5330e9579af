//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements | Connects to                  |
//! |------------|------------|------------------------------|
//! | `sps30`    | SensorPort | SPS30 over Linux `/dev/i2c-N` |
//! | `http`     | ReportPort | Collection endpoint (reqwest) |
//! | `log_sink` | EventSink  | `log` facade                 |

pub mod http;
pub mod log_sink;
pub mod sps30;
