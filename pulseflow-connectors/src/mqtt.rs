//! MQTT connector for PulseFlow
//!
//! Wraps the synchronous `rumqttc` client. A background thread drives the
//! connection and handles the device presence protocol:
//!
//! - a last-will message (`<device>/lastwill`, `offline`) is registered
//!   with the broker at connect time
//! - after every (re)connection the device name is announced on
//!   `device/online` and the `device` topic is subscribed
//! - a `scan` message on `device` is answered with the device name on
//!   `device/scan`
//!
//! `send` only enqueues: it never blocks the reporting loop and never
//! retries. A full request queue or a dropped session is reported as an
//! error and counted in [`ConnectionStats`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use rumqttc::{Client, Connection, Event, LastWill, MqttOptions, Packet};

pub use rumqttc::QoS;

use crate::{ConnectionStats, Connector, ConnectorError};

/// Broker session settings
#[derive(Debug, Clone)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,

    /// Client id, also announced on the presence topics
    pub device_name: String,

    pub username: Option<String>,
    pub password: Option<String>,
    pub keep_alive: Duration,

    /// QoS for reports and presence messages
    pub qos: QoS,

    /// Topic listened on for `scan` requests
    pub presence_topic: String,
    pub online_topic: String,
    pub scan_reply_topic: String,

    pub last_will_topic: String,
    pub last_will_payload: String,

    /// Outgoing request queue length
    pub request_capacity: usize,

    /// Pause after a connection error before the next attempt
    pub reconnect_delay: Duration,
}

impl MqttConfig {
    pub fn new(host: impl Into<String>, device_name: impl Into<String>) -> Self {
        let device_name = device_name.into();
        Self {
            host: host.into(),
            port: 1883,
            last_will_topic: format!("{device_name}/lastwill"),
            last_will_payload: "offline".into(),
            device_name,
            username: None,
            password: None,
            keep_alive: Duration::from_secs(60),
            qos: QoS::AtMostOnce,
            presence_topic: "device".into(),
            online_topic: "device/online".into(),
            scan_reply_topic: "device/scan".into(),
            request_capacity: 10,
            reconnect_delay: Duration::from_secs(5),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn with_qos(mut self, qos: QoS) -> Self {
        self.qos = qos;
        self
    }

    pub fn validate(&self) -> Result<(), ConnectorError> {
        if self.host.is_empty() {
            return Err(ConnectorError::ConfigError("broker host is empty".into()));
        }
        if self.port == 0 {
            return Err(ConnectorError::ConfigError("broker port is zero".into()));
        }
        if self.device_name.is_empty() {
            return Err(ConnectorError::ConfigError("device name is empty".into()));
        }
        if self.request_capacity == 0 {
            return Err(ConnectorError::ConfigError("request capacity is zero".into()));
        }
        Ok(())
    }

    /// Client options including credentials and last will
    pub fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.device_name, &self.host, self.port);
        options.set_keep_alive(self.keep_alive);
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            options.set_credentials(username, password);
        }
        options.set_last_will(LastWill::new(
            &self.last_will_topic,
            self.last_will_payload.as_bytes().to_vec(),
            self.qos,
            false,
        ));
        options
    }

    /// Reply for an incoming message, if it is a presence scan
    pub fn scan_reply(&self, topic: &str, payload: &[u8]) -> Option<(&str, &str)> {
        if topic == self.presence_topic && payload == b"scan" {
            Some((self.scan_reply_topic.as_str(), self.device_name.as_str()))
        } else {
            None
        }
    }
}

struct Shared {
    connected: AtomicBool,
    running: AtomicBool,
    stats: Mutex<ConnectionStats>,
}

impl Shared {
    fn stats(&self) -> MutexGuard<'_, ConnectionStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// MQTT connector backed by a `rumqttc` client and its event thread
pub struct MqttConnector {
    client: Client,
    qos: QoS,
    shared: Arc<Shared>,
}

impl MqttConnector {
    /// Start the session; the connection is established in the background
    pub fn connect(config: MqttConfig) -> Result<Self, ConnectorError> {
        config.validate()?;

        let (client, connection) = Client::new(config.options(), config.request_capacity);
        let shared = Arc::new(Shared {
            connected: AtomicBool::new(false),
            running: AtomicBool::new(true),
            stats: Mutex::new(ConnectionStats::default()),
        });

        log::info!(
            "Connecting to mqtt://{}:{} as {}",
            config.host,
            config.port,
            config.device_name
        );

        let qos = config.qos;
        let worker = {
            let client = client.clone();
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name(format!("mqtt-{}", config.device_name))
                .spawn(move || drive(connection, client, config, shared))
        };
        worker.map_err(|e| ConnectorError::ProtocolError(e.to_string()))?;

        Ok(Self { client, qos, shared })
    }
}

impl Connector for MqttConnector {
    type Error = ConnectorError;

    fn send(&mut self, topic: &str, data: &[u8]) -> Result<(), Self::Error> {
        let result = if self.is_connected() {
            self.client
                .try_publish(topic, self.qos, false, data.to_vec())
                .map_err(|e| ConnectorError::ProtocolError(e.to_string()))
        } else {
            Err(ConnectorError::NotConnected)
        };

        let mut stats = self.shared.stats();
        match &result {
            Ok(()) => stats.record_sent(data.len()),
            Err(e) => stats.record_failed(e),
        }
        result
    }

    fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }

    fn stats(&self) -> ConnectionStats {
        self.shared.stats().clone()
    }
}

impl Drop for MqttConnector {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        if let Err(e) = self.client.try_disconnect() {
            log::debug!("Disconnect request not queued: {}", e);
        }
    }
}

fn drive(mut connection: Connection, client: Client, config: MqttConfig, shared: Arc<Shared>) {
    let mut sessions = 0u32;

    for event in connection.iter() {
        if !shared.running.load(Ordering::Acquire) {
            break;
        }

        match event {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                shared.connected.store(true, Ordering::Release);
                if sessions > 0 {
                    shared.stats().reconnections += 1;
                }
                sessions += 1;
                log::info!("MQTT session established ({})", sessions);
                announce(&client, &config);
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                if let Some((topic, name)) = config.scan_reply(&publish.topic, &publish.payload) {
                    log::debug!("Answering device scan");
                    if let Err(e) = client.try_publish(topic, config.qos, false, name.as_bytes().to_vec()) {
                        log::warn!("Scan reply failed: {}", e);
                    }
                }
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                shared.connected.store(false, Ordering::Release);
            }
            Ok(_) => {}
            Err(e) => {
                shared.connected.store(false, Ordering::Release);
                shared.stats().last_error = Some(e.to_string());
                log::warn!("MQTT connection error: {}", e);

                if !shared.running.load(Ordering::Acquire) {
                    break;
                }
                thread::sleep(config.reconnect_delay);
            }
        }
    }

    shared.connected.store(false, Ordering::Release);
    log::debug!("MQTT event loop stopped");
}

fn announce(client: &Client, config: &MqttConfig) {
    if let Err(e) = client.try_subscribe(&config.presence_topic, QoS::AtMostOnce) {
        log::warn!("Subscribe to {} failed: {}", config.presence_topic, e);
    }
    if let Err(e) = client.try_publish(
        &config.online_topic,
        config.qos,
        false,
        config.device_name.as_bytes().to_vec(),
    ) {
        log::warn!("Online announcement failed: {}", e);
    }
}
