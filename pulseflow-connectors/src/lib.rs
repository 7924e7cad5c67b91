//! Messaging Connectors for PulseFlow Reports
//!
//! ## Overview
//!
//! The metering engine hands structured records to a
//! [`ReportSink`](pulseflow_core::ReportSink). This crate provides the
//! concrete side of that boundary:
//!
//! ```text
//! ReportScheduler ──records──▶ PublishingSink ──topic + JSON──▶ Connector
//!                                                              ├─ MqttConnector
//!                                                              └─ MemoryConnector
//! ```
//!
//! - [`Connector`]: synchronous `send(topic, bytes)`, no implicit retry
//! - [`PublishingSink`]: wraps records in a device envelope and serializes
//!   them with `serde_json`
//! - [`mqtt::MqttConnector`]: broker session with last-will, online
//!   announcement and scan replies
//! - [`memory::MemoryConnector`]: keeps every message, for tests and
//!   simulation
//!
//! ## Payloads
//!
//! Metrics, on the metrics topic:
//!
//! ```json
//! {"name":"meter-01","field":"flow","counter":42,"timeSinceLastEdge":120,
//!  "lastPulseDuration":250,"filteredFlowRate":3.9,"absoluteTime":1700000000000}
//! ```
//!
//! Capture windows, on the capture topic, oldest sample first:
//!
//! ```json
//! {"name":"meter-01","field":"capture","points":[{"value":512,"absoluteTime":1699999999840}, ...]}
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use pulseflow_connectors::{memory::MemoryConnector, PublishingSink, SinkConfig};
//! use pulseflow_core::{MetricsRecord, ReportSink};
//!
//! let mut sink = PublishingSink::new(MemoryConnector::connected(), SinkConfig::new("meter-01"));
//!
//! let record = MetricsRecord {
//!     counter: 42,
//!     time_since_last_edge: 120,
//!     last_pulse_duration: 250,
//!     filtered_flow_rate: 3.9,
//!     absolute_time: 1_700_000_000_000,
//! };
//! ReportSink::<32>::publish_metrics(&mut sink, &record)?;
//!
//! assert_eq!(sink.connector().messages().len(), 1);
//! # Ok::<(), pulseflow_core::PublishError>(())
//! ```

pub mod memory;
#[cfg(feature = "mqtt")]
pub mod mqtt;
pub mod sink;

// Re-export common types
#[cfg(feature = "mqtt")]
pub use mqtt::{MqttConfig, MqttConnector, QoS};
pub use sink::{PublishingSink, SinkConfig};

use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Not connected")]
    NotConnected,

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Trait for all messaging connectors
pub trait Connector {
    type Error: Into<ConnectorError>;

    /// Publish one payload on a topic
    fn send(&mut self, topic: &str, data: &[u8]) -> Result<(), Self::Error>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Get connection statistics
    fn stats(&self) -> ConnectionStats;
}

/// Connection statistics common to all connectors
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Total messages sent successfully
    pub messages_sent: u64,
    /// Total messages failed to send
    pub messages_failed: u64,
    /// Total bytes sent
    pub bytes_sent: u64,
    /// Number of reconnections
    pub reconnections: u32,
    /// Last error message
    pub last_error: Option<String>,
}

impl ConnectionStats {
    pub(crate) fn record_sent(&mut self, bytes: usize) {
        self.messages_sent += 1;
        self.bytes_sent += bytes as u64;
    }

    pub(crate) fn record_failed(&mut self, error: &ConnectorError) {
        self.messages_failed += 1;
        self.last_error = Some(error.to_string());
    }
}
