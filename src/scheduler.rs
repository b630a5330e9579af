//! Fixed-interval scheduler and service lifecycle.
//!
//! ```text
//!   main task                         background task
//!   ─────────                         ───────────────
//!   Initializing
//!   spawn(runner) ──────────────────▶ loop {
//!   Running                             select! {
//!   wait_for_termination()                stop   => break,
//!        │                                tick   => run_cycle().await,
//!        ▼                              }
//!   Draining                          }
//!   handle.shutdown() ──stop──────────▶ (current cycle completes first)
//!        ◀──────────────────runner────
//!   drop runner (bus closed)
//!   Stopped
//! ```
//!
//! Cycles run inside the select arm, so they are strictly sequential and
//! never interrupted. Ticks missed while a cycle overruns the interval are
//! skipped rather than replayed.

use std::sync::Arc;

use log::{debug, info};
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::app::cycle::{CycleOutcome, run_cycle};
use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, ReportPort, SensorPort};
use crate::config::Config;

// ═══════════════════════════════════════════════════════════════
//  Lifecycle
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Loading config, opening the bus, reading the serial.
    Initializing,
    /// Timer armed, cycles running.
    Running,
    /// Termination signal received; waiting for the loop to exit.
    Draining,
    /// Bus released, about to exit.
    Stopped,
}

/// Tracks the service state and reports each transition.
#[derive(Debug)]
pub struct Lifecycle {
    state: LifecycleState,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Initializing,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Move forward to `to`. Transitions only go forward; anything else is
    /// ignored and returns `false`.
    pub fn advance(&mut self, to: LifecycleState, sink: &mut impl EventSink) -> bool {
        use LifecycleState::{Draining, Initializing, Running, Stopped};
        let allowed = matches!(
            (self.state, to),
            (Initializing, Running) | (Running, Draining) | (Draining, Stopped)
        );
        if allowed {
            sink.emit(&AppEvent::LifecycleChanged {
                from: self.state,
                to,
            });
            self.state = to;
        } else {
            debug!("lifecycle: ignoring {:?} -> {:?}", self.state, to);
        }
        allowed
    }
}

// ═══════════════════════════════════════════════════════════════
//  Cycle runner
// ═══════════════════════════════════════════════════════════════

/// Counters kept by the runner; useful in logs and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub cycles: u64,
    pub reported: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Owns everything a cycle needs. The background task holds it
/// exclusively; it is handed back on shutdown so the bus can be released.
pub struct CycleRunner<S, R, E> {
    sensor: S,
    reporter: R,
    config: Arc<Config>,
    sink: E,
    stats: CycleStats,
}

impl<S, R, E> CycleRunner<S, R, E>
where
    S: SensorPort,
    R: ReportPort,
    E: EventSink,
{
    pub fn new(sensor: S, reporter: R, config: Arc<Config>, sink: E) -> Self {
        Self {
            sensor,
            reporter,
            config,
            sink,
            stats: CycleStats::default(),
        }
    }

    /// Run exactly one cycle. Errors are already reported through the
    /// sink by the cycle and only counted here.
    pub async fn tick(&mut self) {
        self.stats.cycles += 1;
        let outcome = run_cycle(
            self.stats.cycles,
            &mut self.sensor,
            &self.reporter,
            &self.config,
            &mut self.sink,
        )
        .await;
        match outcome {
            Ok(CycleOutcome::Reported { .. }) => self.stats.reported += 1,
            Ok(CycleOutcome::Skipped) => self.stats.skipped += 1,
            Err(_) => self.stats.failed += 1,
        }
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    /// Tear down into the sensor (to release the bus) and the sink.
    pub fn into_parts(self) -> (S, E) {
        (self.sensor, self.sink)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Background loop
// ═══════════════════════════════════════════════════════════════

/// Handle to the running background task.
pub struct SchedulerHandle<S, R, E> {
    stop: oneshot::Sender<()>,
    task: JoinHandle<CycleRunner<S, R, E>>,
}

impl<S, R, E> SchedulerHandle<S, R, E> {
    /// Request a stop and wait for the loop to exit. A cycle in flight
    /// (including its HTTP call) runs to completion first.
    pub async fn shutdown(self) -> Result<CycleRunner<S, R, E>, JoinError> {
        // The loop may already be gone if it panicked; the join reports that.
        let _ = self.stop.send(());
        self.task.await
    }
}

/// Arm the interval timer and start the tick loop on a background task.
/// The first cycle runs one full interval after this call.
pub fn spawn<S, R, E>(runner: CycleRunner<S, R, E>) -> SchedulerHandle<S, R, E>
where
    S: SensorPort + Send + 'static,
    R: ReportPort + Send + Sync + 'static,
    E: EventSink + Send + 'static,
{
    let (stop_tx, stop_rx) = oneshot::channel();
    let task = tokio::spawn(run_loop(runner, stop_rx));
    SchedulerHandle {
        stop: stop_tx,
        task,
    }
}

async fn run_loop<S, R, E>(
    mut runner: CycleRunner<S, R, E>,
    mut stop: oneshot::Receiver<()>,
) -> CycleRunner<S, R, E>
where
    S: SensorPort,
    R: ReportPort,
    E: EventSink,
{
    let period = runner.config.interval;
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!("Starting ticker every {}s", period.as_secs());

    loop {
        tokio::select! {
            // Stop wins when both are ready.
            biased;
            _ = &mut stop => break,
            _ = ticker.tick() => runner.tick().await,
        }
    }

    let stats = runner.stats();
    info!(
        "Ticker stopped after {} cycles ({} reported, {} skipped, {} failed)",
        stats.cycles, stats.reported, stats.skipped, stats.failed
    );
    runner
}
