//! Simulated Flow Meter
//!
//! Runs a complete node on the host: one thread plays the pulse-edge
//! interrupt, one the sampling timer, and the main thread runs the
//! reporting loop. Reports are published as JSON through an in-memory
//! connector, or to a real broker when `PULSEFLOW_BROKER` is set.
//!
//! ## Running the Example
//!
//! ```bash
//! RUST_LOG=info cargo run --example simulated_meter
//! PULSEFLOW_BROKER=localhost RUST_LOG=info cargo run --example simulated_meter
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use pulseflow_connectors::memory::MemoryConnector;
use pulseflow_connectors::{Connector, PublishingSink, SinkConfig};
use pulseflow_core::config::EngineConfig;
use pulseflow_core::node::FlowMeter;
use pulseflow_core::scheduler::ReportScheduler;
use pulseflow_core::time::{millis, StdMonotonicClock, SystemWallClock};
use pulseflow_core::MonotonicClock;

const DEVICE: &str = "meter-sim";
const RUN_FOR: Duration = Duration::from_secs(12);

static METER: FlowMeter<32> = FlowMeter::new();

fn main() {
    env_logger::init();

    let config = EngineConfig::default()
        .with_tick_period(millis(10))
        .with_report_period(millis(2000));

    match std::env::var("PULSEFLOW_BROKER") {
        #[cfg(feature = "mqtt")]
        Ok(host) => {
            use pulseflow_connectors::{MqttConfig, MqttConnector};

            match MqttConnector::connect(MqttConfig::new(host, DEVICE)) {
                Ok(connector) => {
                    run(config, connector);
                }
                Err(e) => eprintln!("Cannot start MQTT session: {e}"),
            }
        }
        _ => {
            let connector = run(config, MemoryConnector::connected());
            for (topic, payload) in connector.messages() {
                println!("{topic}: {}", String::from_utf8_lossy(payload));
            }
        }
    }
}

fn run<C: Connector>(config: EngineConfig, connector: C) -> C {
    let clock = StdMonotonicClock::new();
    let running = AtomicBool::new(true);

    let mut sink = PublishingSink::new(connector, SinkConfig::new(DEVICE));
    let mut wall = SystemWallClock;

    thread::scope(|s| {
        // Pulse input: about 8 pulses per second with some jitter
        s.spawn(|| {
            let mut n = 0u64;
            while running.load(Ordering::Relaxed) {
                n += 1;
                thread::sleep(Duration::from_millis(110 + (n * 37) % 30));
                METER.on_edge(clock.now());
            }
        });

        // Sampling timer: a slow ramp as the analog signal
        s.spawn(|| {
            let mut sample = 0u16;
            while running.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_millis(config.tick_period.ticks() as u64));
                METER.on_tick(sample);
                sample = sample.wrapping_add(3) % 4096;
            }
        });

        let mut scheduler = match ReportScheduler::starting_at(&config, clock.now()) {
            Ok(scheduler) => scheduler,
            Err(e) => {
                eprintln!("Invalid configuration: {e}");
                running.store(false, Ordering::Relaxed);
                return;
            }
        };

        let started = std::time::Instant::now();
        while started.elapsed() < RUN_FOR {
            match scheduler.poll(clock.now(), &METER, &mut wall, &mut sink) {
                Ok(outcome) => log::info!(
                    "Report: rate {:.2}/s, capture {:?}",
                    outcome.estimate.filtered,
                    outcome.capture
                ),
                Err(nb::Error::WouldBlock) => {}
                Err(nb::Error::Other(e)) => log::warn!("{e}"),
            }
            thread::sleep(Duration::from_millis(5));
        }
        running.store(false, Ordering::Relaxed);

        println!("Scheduler: {:?}", scheduler.stats());
    });

    println!("Connection: {:?}", sink.connector().stats());
    sink.into_inner()
}
