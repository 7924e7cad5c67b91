//! Report Sink Abstraction
//!
//! The engine hands structured records to a sink and never formats payloads
//! itself. A sink decides the wire format (JSON over MQTT in
//! `pulseflow-connectors`, an in-memory log in tests) and reports success or
//! failure synchronously. Sinks must not retry on their own: the scheduler
//! records the failure and moves on.

use crate::errors::PublishError;
use crate::records::{CaptureRecord, MetricsRecord};

/// Destination for exported records
pub trait ReportSink<const N: usize> {
    /// Publish one metrics record
    fn publish_metrics(&mut self, record: &MetricsRecord) -> Result<(), PublishError>;

    /// Publish one capture window, oldest sample first
    fn publish_capture(&mut self, record: &CaptureRecord<N>) -> Result<(), PublishError>;
}

impl<const N: usize, S: ReportSink<N> + ?Sized> ReportSink<N> for &mut S {
    fn publish_metrics(&mut self, record: &MetricsRecord) -> Result<(), PublishError> {
        (**self).publish_metrics(record)
    }

    fn publish_capture(&mut self, record: &CaptureRecord<N>) -> Result<(), PublishError> {
        (**self).publish_capture(record)
    }
}
