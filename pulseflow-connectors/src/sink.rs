//! Record publishing over a connector
//!
//! [`PublishingSink`] is the [`ReportSink`] implementation for networked
//! nodes. Every record is wrapped in an envelope naming the device and the
//! field it reports, serialized to JSON and sent on its topic. Failures are
//! mapped onto [`PublishError`] and returned; nothing is queued or retried.

use pulseflow_core::{CaptureRecord, MetricsRecord, PublishError, ReportSink};
use serde::Serialize;

use crate::{Connector, ConnectorError};

/// Topics and labels used when publishing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Device name carried in every envelope
    pub device_name: String,
    pub metrics_topic: String,
    pub metrics_field: String,
    pub capture_topic: String,
    pub capture_field: String,
}

impl SinkConfig {
    /// Defaults: metrics on `sensors` as `flow`, captures on
    /// `sensors/capture` as `capture`
    pub fn new(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            metrics_topic: "sensors".into(),
            metrics_field: "flow".into(),
            capture_topic: "sensors/capture".into(),
            capture_field: "capture".into(),
        }
    }

    pub fn with_metrics_topic(mut self, topic: impl Into<String>) -> Self {
        self.metrics_topic = topic.into();
        self
    }

    pub fn with_capture_topic(mut self, topic: impl Into<String>) -> Self {
        self.capture_topic = topic.into();
        self
    }
}

#[derive(Serialize)]
struct MetricsEnvelope<'a> {
    name: &'a str,
    field: &'a str,
    #[serde(flatten)]
    record: &'a MetricsRecord,
}

#[derive(Serialize)]
struct CaptureEnvelope<'a, const N: usize> {
    name: &'a str,
    field: &'a str,
    points: &'a CaptureRecord<N>,
}

/// [`ReportSink`] that publishes JSON envelopes through a [`Connector`]
#[derive(Debug)]
pub struct PublishingSink<C> {
    connector: C,
    config: SinkConfig,
}

impl<C: Connector> PublishingSink<C> {
    pub fn new(connector: C, config: SinkConfig) -> Self {
        Self { connector, config }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn connector_mut(&mut self) -> &mut C {
        &mut self.connector
    }

    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    pub fn into_inner(self) -> C {
        self.connector
    }

    /// Serialized metrics envelope
    pub fn encode_metrics(&self, record: &MetricsRecord) -> Result<Vec<u8>, ConnectorError> {
        let envelope = MetricsEnvelope {
            name: &self.config.device_name,
            field: &self.config.metrics_field,
            record,
        };
        Ok(serde_json::to_vec(&envelope)?)
    }

    /// Serialized capture envelope
    pub fn encode_capture<const N: usize>(
        &self,
        record: &CaptureRecord<N>,
    ) -> Result<Vec<u8>, ConnectorError> {
        let envelope = CaptureEnvelope {
            name: &self.config.device_name,
            field: &self.config.capture_field,
            points: record,
        };
        Ok(serde_json::to_vec(&envelope)?)
    }
}

impl<C: Connector, const N: usize> ReportSink<N> for PublishingSink<C> {
    fn publish_metrics(&mut self, record: &MetricsRecord) -> Result<(), PublishError> {
        let payload = self.encode_metrics(record);
        deliver(&mut self.connector, &self.config.metrics_topic, payload)
    }

    fn publish_capture(&mut self, record: &CaptureRecord<N>) -> Result<(), PublishError> {
        let payload = self.encode_capture(record);
        deliver(&mut self.connector, &self.config.capture_topic, payload)
    }
}

fn deliver<C: Connector>(
    connector: &mut C,
    topic: &str,
    payload: Result<Vec<u8>, ConnectorError>,
) -> Result<(), PublishError> {
    let payload = payload.map_err(|e| {
        log::warn!("Failed to encode report: {}", e);
        to_publish_error(&e)
    })?;

    connector.send(topic, &payload).map_err(|e| {
        let e: ConnectorError = e.into();
        log::warn!("Publish on {} failed: {}", topic, e);
        to_publish_error(&e)
    })
}

fn to_publish_error(error: &ConnectorError) -> PublishError {
    match error {
        ConnectorError::NotConnected => PublishError::NotConnected,
        ConnectorError::Serialization(_) => PublishError::Encoding { reason: "json" },
        ConnectorError::ProtocolError(_) => PublishError::Rejected { reason: "protocol" },
        ConnectorError::ConfigError(_) => PublishError::Rejected { reason: "configuration" },
    }
}
