//! End-to-end publishing tests
//!
//! A meter driven by hand, reported through `PublishingSink` into the
//! in-memory connector; payloads are checked as JSON.

use pulseflow_connectors::memory::MemoryConnector;
use pulseflow_connectors::{Connector, PublishingSink, SinkConfig};
use pulseflow_core::config::EngineConfig;
use pulseflow_core::node::FlowMeter;
use pulseflow_core::scheduler::{CaptureOutcome, ReportScheduler};
use pulseflow_core::time::{instant, millis, FixedWallClock};
use pulseflow_core::PublishError;
use serde_json::Value;

const EPOCH: u64 = 1_700_000_000_000;

fn config() -> EngineConfig {
    EngineConfig::default()
        .with_tick_period(millis(10))
        .with_report_period(millis(5000))
}

fn ready_meter() -> FlowMeter<32> {
    let meter = FlowMeter::<32>::new();
    for v in 0..32 {
        meter.on_tick(v);
    }
    meter.on_edge(instant(1000));
    for v in 100..116 {
        meter.on_tick(v);
    }
    meter
}

#[test]
fn report_pass_publishes_metrics_and_capture() {
    let meter = ready_meter();
    let mut clock = FixedWallClock::valid_at(EPOCH);
    let mut sink = PublishingSink::new(MemoryConnector::connected(), SinkConfig::new("meter-01"));
    let mut scheduler = ReportScheduler::new(&config(), instant(0)).unwrap();

    let outcome = scheduler
        .poll(instant(1500), &meter, &mut clock, &mut sink)
        .unwrap();
    assert_eq!(outcome.metrics, Ok(()));
    assert_eq!(outcome.capture, CaptureOutcome::Published);

    let connector = sink.connector();
    let metrics: Vec<Value> = connector
        .payloads("sensors")
        .map(|p| serde_json::from_slice(p).unwrap())
        .collect();
    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0]["name"], "meter-01");
    assert_eq!(metrics[0]["counter"], 1);
    assert_eq!(metrics[0]["timeSinceLastEdge"], 500);
    assert_eq!(metrics[0]["absoluteTime"], EPOCH);

    let captures: Vec<Value> = connector
        .payloads("sensors/capture")
        .map(|p| serde_json::from_slice(p).unwrap())
        .collect();
    let points = captures[0]["points"].as_array().unwrap();
    assert_eq!(points.len(), 32);

    // Edge happened 500 ms before the report
    let t_edge = EPOCH - 500;
    assert_eq!(points[16]["absoluteTime"], t_edge);
    assert_eq!(points[16]["value"], 31);
    assert_eq!(points[17]["value"], 100);
    assert_eq!(points[0]["absoluteTime"], t_edge - 160);
    assert_eq!(points[31]["absoluteTime"], t_edge + 150);
}

#[test]
fn metrics_precede_capture() {
    let meter = ready_meter();
    let mut clock = FixedWallClock::valid_at(EPOCH);
    let mut sink = PublishingSink::new(MemoryConnector::connected(), SinkConfig::new("meter-01"));
    let mut scheduler = ReportScheduler::new(&config(), instant(0)).unwrap();

    scheduler
        .poll(instant(1500), &meter, &mut clock, &mut sink)
        .unwrap();

    let topics: Vec<&str> = sink
        .connector()
        .messages()
        .iter()
        .map(|(topic, _)| topic.as_str())
        .collect();
    assert_eq!(topics, ["sensors", "sensors/capture"]);
}

#[test]
fn offline_connector_counts_failures() {
    let meter = ready_meter();
    let mut clock = FixedWallClock::valid_at(EPOCH);
    let mut sink = PublishingSink::new(MemoryConnector::new(), SinkConfig::new("meter-01"));
    let mut scheduler = ReportScheduler::new(&config(), instant(0)).unwrap();

    let outcome = scheduler
        .poll(instant(1500), &meter, &mut clock, &mut sink)
        .unwrap();
    assert_eq!(outcome.metrics, Err(PublishError::NotConnected));
    assert_eq!(
        outcome.capture,
        CaptureOutcome::Failed(PublishError::NotConnected)
    );

    let stats = sink.connector().stats();
    assert_eq!(stats.messages_failed, 2);
    assert_eq!(stats.messages_sent, 0);
    assert_eq!(scheduler.stats().publish_failures, 2);
    assert_eq!(scheduler.next_due(), instant(5000));

    // Back online for the next period
    sink.connector_mut().set_connected(true);
    let outcome = scheduler
        .poll(instant(5000), &meter, &mut clock, &mut sink)
        .unwrap();
    assert_eq!(outcome.metrics, Ok(()));
    assert_eq!(sink.connector().stats().messages_sent, 1);
}
