//! PM reporter main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                   │
//! │                                                            │
//! │   Sps30<I2cdev>        HttpReporter        LogEventSink    │
//! │   (SensorPort)         (ReportPort)        (EventSink)     │
//! │                                                            │
//! │  ──────────────── Port Trait Boundary ──────────────────   │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │        run_cycle · report (pure logic)               │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! │                                                            │
//! │  Scheduler (interval + one-shot stop) · signal wait        │
//! └────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pmreporter::adapters::http::HttpReporter;
use pmreporter::adapters::log_sink::LogEventSink;
use pmreporter::adapters::sps30;
use pmreporter::app::events::AppEvent;
use pmreporter::app::ports::{EventSink, SensorPort};
use pmreporter::config::Config;
use pmreporter::scheduler::{self, CycleRunner, Lifecycle, LifecycleState};
use pmreporter::shutdown;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Environment + logging ──────────────────────────────
    // Real environment variables win over .env entries.
    let dotenv = dotenvy::dotenv();

    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("PMReporter v{}", env!("CARGO_PKG_VERSION"));
    match dotenv {
        Ok(path) => info!("Loaded env file {}", path.display()),
        Err(e) if e.not_found() => info!("No env file, using process environment"),
        Err(e) => warn!("Error reading env file: {}", e),
    }

    let mut sink = LogEventSink::new();
    let mut lifecycle = Lifecycle::new();

    // ── 2. Configuration (fatal on any missing value) ─────────
    let config = Arc::new(Config::from_env().context("loading configuration")?);
    info!("Config: {:?}", config);

    // ── 3. Sensor bus (fatal on open failure) ─────────────────
    let mut sensor = sps30::open_linux(&config.i2c_device, config.i2c_address)
        .context("opening sensor bus")?;

    match sensor.read_serial() {
        Ok(serial) => sink.emit(&AppEvent::SerialRead(serial)),
        Err(e) => warn!("Could not read sensor serial: {}", e),
    }

    // ── 4. Reporter ───────────────────────────────────────────
    let reporter = HttpReporter::new(&config).context("building HTTP client")?;

    // ── 5. Run until a termination signal ─────────────────────
    let runner = CycleRunner::new(sensor, reporter, Arc::clone(&config), LogEventSink::new());
    let handle = scheduler::spawn(runner);
    lifecycle.advance(LifecycleState::Running, &mut sink);

    let wait = shutdown::wait_for_termination().await;

    // ── 6. Drain ──────────────────────────────────────────────
    lifecycle.advance(LifecycleState::Draining, &mut sink);
    let runner = handle.shutdown().await.context("tick loop panicked")?;
    let runner_stats = runner.stats();
    let (sensor, _) = runner.into_parts();
    drop(sensor.release());
    info!("I2C bus released");
    lifecycle.advance(LifecycleState::Stopped, &mut sink);

    info!(
        "Exiting in state {:?} after {} cycles ({} reported)",
        lifecycle.state(),
        runner_stats.cycles,
        runner_stats.reported
    );
    wait.context("installing signal handlers")?;
    Ok(())
}
