//! Basic Metering Example
//!
//! Drives a meter by hand: a short pulse train, sampling ticks in between,
//! and one report pass printed to the console.
//!
//! ## What You'll Learn
//!
//! - Feeding edge and tick events into a `FlowMeter`
//! - Polling the `ReportScheduler` and reading its outcome
//! - How a capture window is timestamped around its edge
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_basic_metering
//! ```

use pulseflow_core::{
    config::EngineConfig,
    events::EngineEvent,
    node::FlowMeter,
    scheduler::{CaptureOutcome, ReportScheduler},
    time::{instant, millis, FixedWallClock},
    CaptureRecord, MetricsRecord, PublishError, ReportSink,
};

/// Prints every record it receives
struct ConsoleSink;

impl ReportSink<16> for ConsoleSink {
    fn publish_metrics(&mut self, record: &MetricsRecord) -> Result<(), PublishError> {
        println!("Metrics:");
        println!("  counter:              {}", record.counter);
        println!("  time since last edge: {} ms", record.time_since_last_edge);
        println!("  last pulse duration:  {} ms", record.last_pulse_duration);
        println!("  filtered flow rate:   {:.3} pulses/s", record.filtered_flow_rate);
        Ok(())
    }

    fn publish_capture(&mut self, record: &CaptureRecord<16>) -> Result<(), PublishError> {
        println!("Capture window ({} samples):", record.len());
        for point in record.iter() {
            println!("  {:>16} ms  {:>5}", point.absolute_time, point.value);
        }
        Ok(())
    }
}

fn main() {
    println!("PulseFlow Basic Metering Example");
    println!("================================\n");

    let config = EngineConfig::default()
        .with_tick_period(millis(10))
        .with_report_period(millis(1000));

    let meter = FlowMeter::<16>::new();
    let mut clock = FixedWallClock::valid_at(1_700_000_000_000);
    let mut scheduler = match ReportScheduler::starting_at(&config, instant(0)) {
        Ok(scheduler) => scheduler,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return;
        }
    };

    // Pulses every 120 ms, a sine-ish analog signal sampled every 10 ms
    for t in 1..=1000u32 {
        if t % 10 == 0 {
            let sample = (2048.0 + 1000.0 * (t as f32 / 50.0).sin()) as u16;
            meter.handle(EngineEvent::tick(sample));
        }
        if t % 120 == 0 {
            meter.handle(EngineEvent::edge(instant(t)));
        }
    }
    clock.advance(1000);

    match scheduler.poll(instant(1000), &meter, &mut clock, &mut ConsoleSink) {
        Ok(outcome) => {
            println!();
            match outcome.capture {
                CaptureOutcome::Published => println!("Capture exported"),
                CaptureOutcome::Idle => println!("No capture ready"),
                other => println!("Capture not exported: {other:?}"),
            }
        }
        Err(nb::Error::WouldBlock) => println!("Report not due yet"),
        Err(nb::Error::Other(e)) => println!("Reporting gated: {e}"),
    }

    println!("\nScheduler stats: {:?}", scheduler.stats());
}
