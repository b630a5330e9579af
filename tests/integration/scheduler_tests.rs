//! Background tick loop: timing, sequencing and cooperative shutdown.
//!
//! All tests run on a paused tokio clock, so "seconds" below are virtual.

use std::sync::Arc;
use std::time::Duration;

use pmreporter::app::reading::Reading;
use pmreporter::scheduler::{self, CycleRunner, CycleStats};
use tokio::time::{Instant, sleep};

use super::mock_hw::{MockReporter, MockSensor, RecordingSink, SensorCall, test_config};

fn pm25(mass: f32) -> Reading {
    Reading {
        mass_pm2_5: mass,
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn first_cycle_waits_one_full_interval() {
    let sensor = MockSensor::ready_with(pm25(1.0));
    let reporter = MockReporter::new(200);
    let runner = CycleRunner::new(
        sensor.clone(),
        reporter.clone(),
        Arc::new(test_config(5)),
        RecordingSink::default(),
    );
    let handle = scheduler::spawn(runner);

    sleep(Duration::from_millis(4_900)).await;
    assert!(sensor.calls().is_empty());

    let runner = handle.shutdown().await.unwrap();
    assert_eq!(runner.stats().cycles, 0);
}

#[tokio::test(start_paused = true)]
async fn five_second_interval_posts_once_per_tick() {
    let start = Instant::now();
    let sensor = MockSensor::ready_with(pm25(12.7));
    let reporter = MockReporter::new(200);
    let config = Arc::new(test_config(5));
    let settle = config.settle;
    let runner = CycleRunner::new(
        sensor.clone(),
        reporter.clone(),
        config,
        RecordingSink::default(),
    );
    let handle = scheduler::spawn(runner);

    // Tick at t=5, POST after the settle delay, nothing more before t=10.
    sleep(Duration::from_millis(9_900)).await;
    let deliveries = reporter.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert!(deliveries[0].payload.contains(r#""pm2dot5":12,"#));
    let offset = deliveries[0].at - start;
    assert!(offset >= Duration::from_secs(5) + settle);
    assert!(offset < Duration::from_secs(5) + settle + Duration::from_secs(1));

    // Second tick at t=10.
    sleep(Duration::from_secs(3)).await;
    let deliveries = reporter.deliveries();
    assert_eq!(deliveries.len(), 2);
    assert!(deliveries[1].at - start >= Duration::from_secs(10));

    let runner = handle.shutdown().await.unwrap();
    assert_eq!(
        runner.stats(),
        CycleStats {
            cycles: 2,
            reported: 2,
            skipped: 0,
            failed: 0,
        }
    );
}

#[tokio::test(start_paused = true)]
async fn stop_while_waiting_runs_no_further_cycle() {
    let sensor = MockSensor::ready_with(pm25(3.0));
    let reporter = MockReporter::new(200);
    let runner = CycleRunner::new(
        sensor.clone(),
        reporter.clone(),
        Arc::new(test_config(5)),
        RecordingSink::default(),
    );
    let handle = scheduler::spawn(runner);

    // One full cycle (t=5..7), then stop during the wait for t=10.
    sleep(Duration::from_secs(8)).await;
    assert_eq!(reporter.deliveries().len(), 1);

    let runner = handle.shutdown().await.unwrap();
    sleep(Duration::from_secs(20)).await;

    assert_eq!(runner.stats().cycles, 1);
    assert_eq!(sensor.count(SensorCall::Start), 1);
    assert_eq!(reporter.deliveries().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_during_pending_post_lets_it_finish() {
    let sensor = MockSensor::ready_with(pm25(3.0));
    let reporter = MockReporter::new(200).with_latency(Duration::from_secs(3));
    let runner = CycleRunner::new(
        sensor.clone(),
        reporter.clone(),
        Arc::new(test_config(5)),
        RecordingSink::default(),
    );
    let handle = scheduler::spawn(runner);

    // Tick at 5, settle to 7, POST in flight until 10; stop requested at 8.
    sleep(Duration::from_secs(8)).await;
    let pending = reporter.deliveries();
    assert_eq!(pending.len(), 1);
    assert!(!pending[0].completed);

    let stopped_at = Instant::now();
    let runner = handle.shutdown().await.unwrap();

    assert!(Instant::now() - stopped_at >= Duration::from_secs(2));
    let done = reporter.deliveries();
    assert_eq!(done.len(), 1);
    assert!(done[0].completed, "in-flight POST must complete");
    assert_eq!(sensor.count(SensorCall::Stop), 1);
    assert_eq!(runner.stats().reported, 1);
}

#[tokio::test(start_paused = true)]
async fn overrunning_cycles_never_overlap() {
    // 1 s interval but every cycle takes 2 s settle + 1.5 s POST.
    let sensor = MockSensor::ready_with(pm25(3.0));
    let reporter = MockReporter::new(200).with_latency(Duration::from_millis(1_500));
    let runner = CycleRunner::new(
        sensor.clone(),
        reporter.clone(),
        Arc::new(test_config(1)),
        RecordingSink::default(),
    );
    let handle = scheduler::spawn(runner);

    sleep(Duration::from_secs(12)).await;
    let runner = handle.shutdown().await.unwrap();

    let calls = sensor.calls();
    for cycle in calls.chunks(4) {
        assert_eq!(
            cycle,
            [
                SensorCall::Start,
                SensorCall::Ready,
                SensorCall::Read,
                SensorCall::Stop
            ]
        );
    }

    // Missed ticks are skipped, not replayed: at most one cycle per 3.5 s
    // of virtual time after the first tick.
    let stats = runner.stats();
    assert!(stats.cycles >= 3 && stats.cycles <= 4, "{stats:?}");
    assert_eq!(stats.cycles, stats.reported);
}

#[tokio::test(start_paused = true)]
async fn skipped_and_failed_cycles_do_not_stop_the_loop() {
    let sensor = MockSensor::never_ready();
    let reporter = MockReporter::new(500);
    let runner = CycleRunner::new(
        sensor.clone(),
        reporter.clone(),
        Arc::new(test_config(5)),
        RecordingSink::default(),
    );
    let handle = scheduler::spawn(runner);

    sleep(Duration::from_secs(8)).await;
    sensor.state.lock().unwrap().ready = true;
    sleep(Duration::from_secs(5)).await;

    let runner = handle.shutdown().await.unwrap();
    let stats = runner.stats();
    assert_eq!(stats.cycles, 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.failed, 1, "HTTP 500 counts as a failed cycle");
    assert_eq!(reporter.deliveries().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn sensor_errors_do_not_stop_the_loop() {
    let sensor = MockSensor::ready_with(pm25(8.2));
    sensor.state.lock().unwrap().fail_start = true;
    let reporter = MockReporter::new(200);
    let runner = CycleRunner::new(
        sensor.clone(),
        reporter.clone(),
        Arc::new(test_config(5)),
        RecordingSink::default(),
    );
    let handle = scheduler::spawn(runner);

    // t=5: start fails, no stop.
    sleep(Duration::from_secs(6)).await;
    assert_eq!(sensor.calls(), [SensorCall::Start]);
    {
        let mut s = sensor.state.lock().unwrap();
        s.fail_start = false;
        s.fail_read = true;
    }

    // t=10: read fails after settle, stop still issued.
    sleep(Duration::from_secs(7)).await;
    assert_eq!(sensor.count(SensorCall::Stop), 1);
    assert!(reporter.deliveries().is_empty());
    sensor.state.lock().unwrap().fail_read = false;

    // t=15: normal cycle, POST at t=17.
    sleep(Duration::from_secs(5)).await;
    let runner = handle.shutdown().await.unwrap();

    assert_eq!(
        runner.stats(),
        CycleStats {
            cycles: 3,
            reported: 1,
            skipped: 0,
            failed: 2,
        }
    );
    assert_eq!(sensor.count(SensorCall::Start), 3);
    assert_eq!(sensor.count(SensorCall::Stop), 2);
    let deliveries = reporter.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert!(deliveries[0].payload.contains(r#""pm2dot5":8,"#));
}
