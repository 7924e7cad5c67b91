//! In-memory connector
//!
//! Keeps every published message in order. Used by tests and by the
//! simulation example to inspect exactly what a node would have sent.

use crate::{ConnectionStats, Connector, ConnectorError};

/// Connector that stores messages instead of sending them
#[derive(Debug, Default, Clone)]
pub struct MemoryConnector {
    connected: bool,
    messages: Vec<(String, Vec<u8>)>,
    stats: ConnectionStats,
}

impl MemoryConnector {
    /// Disconnected connector; every send fails until [`Self::set_connected`]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connected() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    /// Toggle the link; going from down to up counts as a reconnection
    pub fn set_connected(&mut self, connected: bool) {
        if connected && !self.connected && self.stats.messages_sent > 0 {
            self.stats.reconnections += 1;
        }
        self.connected = connected;
    }

    /// Messages sent so far, oldest first
    pub fn messages(&self) -> &[(String, Vec<u8>)] {
        &self.messages
    }

    /// Payloads sent on one topic
    pub fn payloads<'a>(&'a self, topic: &'a str) -> impl Iterator<Item = &'a [u8]> + 'a {
        self.messages
            .iter()
            .filter(move |(t, _)| t == topic)
            .map(|(_, payload)| payload.as_slice())
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl Connector for MemoryConnector {
    type Error = ConnectorError;

    fn send(&mut self, topic: &str, data: &[u8]) -> Result<(), Self::Error> {
        if !self.connected {
            let error = ConnectorError::NotConnected;
            self.stats.record_failed(&error);
            return Err(error);
        }

        self.messages.push((topic.to_owned(), data.to_vec()));
        self.stats.record_sent(data.len());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn stats(&self) -> ConnectionStats {
        self.stats.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_in_order() {
        let mut connector = MemoryConnector::connected();
        connector.send("a", b"1").unwrap();
        connector.send("b", b"22").unwrap();
        connector.send("a", b"333").unwrap();

        let a: Vec<_> = connector.payloads("a").collect();
        assert_eq!(a, vec![&b"1"[..], &b"333"[..]]);

        let stats = connector.stats();
        assert_eq!(stats.messages_sent, 3);
        assert_eq!(stats.bytes_sent, 6);
    }

    #[test]
    fn disconnected_send_fails() {
        let mut connector = MemoryConnector::new();
        assert!(matches!(
            connector.send("a", b"1"),
            Err(ConnectorError::NotConnected)
        ));

        let stats = connector.stats();
        assert_eq!(stats.messages_failed, 1);
        assert_eq!(stats.last_error.as_deref(), Some("Not connected"));
        assert!(connector.messages().is_empty());
    }

    #[test]
    fn reconnection_counted() {
        let mut connector = MemoryConnector::connected();
        connector.send("a", b"1").unwrap();
        connector.set_connected(false);
        connector.set_connected(true);
        assert_eq!(connector.stats().reconnections, 1);
    }
}
