//! One cycle end to end against mock adapters.

use chrono::{DateTime, Timelike};
use pmreporter::app::cycle::{CycleOutcome, run_cycle};
use pmreporter::app::events::AppEvent;
use pmreporter::app::reading::Reading;
use serde_json::Value;

use super::mock_hw::{LAT, LON, MockReporter, MockSensor, RecordingSink, SensorCall, test_config};

fn only_report(reporter: &MockReporter) -> serde_json::Map<String, Value> {
    let deliveries = reporter.deliveries();
    assert_eq!(deliveries.len(), 1, "exactly one POST per reading");
    let body: Value = serde_json::from_str(&deliveries[0].payload).unwrap();
    let array = body.as_array().expect("payload is a JSON array");
    assert_eq!(array.len(), 1, "array always has exactly one element");
    array[0].as_object().unwrap().clone()
}

#[tokio::test(start_paused = true)]
async fn never_ready_stops_once_and_reports_nothing() {
    let mut sensor = MockSensor::never_ready();
    let reporter = MockReporter::new(200);
    let mut sink = RecordingSink::default();

    let out = run_cycle(1, &mut sensor, &reporter, &test_config(5), &mut sink).await;

    assert_eq!(out, Ok(CycleOutcome::Skipped));
    assert_eq!(sensor.count(SensorCall::Stop), 1);
    assert_eq!(sensor.count(SensorCall::Read), 0);
    assert!(reporter.deliveries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn mass_values_are_truncated_not_rounded() {
    let mut sensor = MockSensor::ready_with(Reading {
        mass_pm1_0: 0.999,
        mass_pm2_5: 4.999,
        mass_pm10: 9.5,
        ..Default::default()
    });
    let reporter = MockReporter::new(200);
    let mut sink = RecordingSink::default();

    let out = run_cycle(1, &mut sensor, &reporter, &test_config(5), &mut sink).await;
    assert_eq!(out, Ok(CycleOutcome::Reported { status: 200 }));

    let report = only_report(&reporter);
    assert_eq!(report["pm1dot0"], 0);
    assert_eq!(report["pm2dot5"], 4);
    assert_eq!(report["pm10"], 9);
}

#[tokio::test(start_paused = true)]
async fn report_carries_static_metadata() {
    let mut sensor = MockSensor::ready_with(Reading {
        mass_pm2_5: 12.7,
        ..Default::default()
    });
    let reporter = MockReporter::new(201);
    let mut sink = RecordingSink::default();

    run_cycle(1, &mut sensor, &reporter, &test_config(5), &mut sink)
        .await
        .unwrap();

    let report = only_report(&reporter);
    assert_eq!(report["sensor"], "SPS30");
    assert_eq!(report["source"], "Barcequillo 1");
    assert_eq!(report["description"], "Barcequillo rooftop");
    assert_eq!(report["latitude"].as_f64().unwrap() as f32, LAT);
    assert_eq!(report["longitude"].as_f64().unwrap() as f32, LON);

    let recorded = report["recorded"].as_str().unwrap();
    let parsed = DateTime::parse_from_rfc3339(recorded).unwrap();
    assert_eq!(parsed.offset().local_minus_utc(), 0);
    let fraction = recorded.split('.').nth(1).unwrap().trim_end_matches('Z');
    assert_eq!(fraction.len(), 9, "nanosecond precision");
    assert!(parsed.nanosecond() < 1_000_000_000);
}

#[tokio::test(start_paused = true)]
async fn events_follow_cycle_order() {
    let mut sensor = MockSensor::ready_with(Reading::default());
    let reporter = MockReporter::new(200);
    let mut sink = RecordingSink::default();

    run_cycle(7, &mut sensor, &reporter, &test_config(5), &mut sink)
        .await
        .unwrap();

    let names: Vec<&str> = sink
        .events()
        .iter()
        .map(|e| match e {
            AppEvent::CycleStarted { cycle: 7 } => "started",
            AppEvent::MeasurementStopped => "stopped",
            AppEvent::Measured(_) => "measured",
            AppEvent::PayloadBuilt(_) => "payload",
            AppEvent::ResponseReceived { .. } => "response",
            other => panic!("unexpected event {other:?}"),
        })
        .collect();
    assert_eq!(
        names,
        ["started", "stopped", "measured", "payload", "response"]
    );
    assert_eq!(
        sensor.calls(),
        [
            SensorCall::Start,
            SensorCall::Ready,
            SensorCall::Read,
            SensorCall::Stop
        ]
    );
}
