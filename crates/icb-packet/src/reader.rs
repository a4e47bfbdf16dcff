use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use icb_transport::IcbStream;
use tracing::trace;

use crate::codec::{decode_packet, truncated, PacketConfig};
use crate::error::{PacketError, Result};
use crate::message::Message;

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;
const READ_CHUNK_SIZE: usize = 4 * 1024;

/// Reads complete messages from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete packets.
/// Bytes read past the end of one packet are kept for the next call.
pub struct PacketReader<T> {
    inner: T,
    buf: BytesMut,
    config: PacketConfig,
}

impl<T: Read> PacketReader<T> {
    /// Create a new packet reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, PacketConfig::default())
    }

    /// Create a new packet reader with explicit configuration.
    pub fn with_config(inner: T, config: PacketConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next complete message (blocking).
    ///
    /// Returns `Err(PacketError::ConnectionClosed)` when EOF falls between
    /// packets and `Err(PacketError::Truncated { .. })` when it falls inside one.
    pub fn read_message(&mut self) -> Result<Message> {
        loop {
            if let Some(message) = decode_packet(&mut self.buf, self.config.max_extended_length)? {
                trace!(
                    packet_type = %message.packet_type(),
                    length = message.length(),
                    "decoded packet"
                );
                return Ok(message);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(PacketError::Io(err)),
            };

            if read == 0 {
                return Err(truncated(&self.buf));
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Bytes received but not yet decoded.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    ///
    /// Any buffered, undecoded bytes are discarded.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update the extended-length bound for subsequent decoding.
    pub fn set_max_extended_length(&mut self, max_extended_length: usize) {
        self.config.max_extended_length = max_extended_length;
    }

    /// Current packet reader configuration.
    pub fn config(&self) -> &PacketConfig {
        &self.config
    }
}

impl<T: Read> Iterator for PacketReader<T> {
    type Item = Result<Message>;

    /// Yields messages until the stream closes cleanly between packets.
    fn next(&mut self) -> Option<Self::Item> {
        match self.read_message() {
            Err(PacketError::ConnectionClosed) => None,
            other => Some(other),
        }
    }
}

impl PacketReader<IcbStream> {
    /// Create a packet reader for `IcbStream` and apply read timeout from config.
    pub fn with_config_stream(inner: IcbStream, config: PacketConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_packet_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_packet_error(err: icb_transport::TransportError) -> PacketError {
    match err {
        icb_transport::TransportError::Io(io) => PacketError::Io(io),
        icb_transport::TransportError::Resolve { source, .. }
        | icb_transport::TransportError::Connect { source, .. } => PacketError::Io(source),
        other => PacketError::Io(std::io::Error::other(other.to_string())),
    }
}
