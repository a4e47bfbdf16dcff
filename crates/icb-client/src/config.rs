use std::time::Duration;

use icb_packet::{PacketConfig, DEFAULT_MAX_EXTENDED_LENGTH};
use icb_transport::{DEFAULT_HOST, DEFAULT_PORT};

/// Where to connect and how long blocking calls may take.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Server host name or address. Default: `127.0.0.1`.
    pub host: String,
    /// Server port. Default: `7326`.
    pub port: u16,
    /// Bound on each TCP connect attempt.
    pub connect_timeout: Option<Duration>,
    /// Read timeout applied to the socket.
    pub read_timeout: Option<Duration>,
    /// Write timeout applied to the socket.
    pub write_timeout: Option<Duration>,
    /// Maximum length accepted for extended packets.
    pub max_extended_length: usize,
}

impl ConnectionConfig {
    /// Config for `host:port` with no timeouts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    /// `host:port`, as used in logs and error messages.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Packet reader/writer settings derived from this config.
    pub fn packet_config(&self) -> PacketConfig {
        PacketConfig {
            max_extended_length: self.max_extended_length,
            read_timeout: self.read_timeout,
            write_timeout: self.write_timeout,
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout: None,
            read_timeout: None,
            write_timeout: None,
            max_extended_length: DEFAULT_MAX_EXTENDED_LENGTH,
        }
    }
}
