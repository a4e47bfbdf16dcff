use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use icb_transport::IcbStream;
use tracing::trace;

use crate::codec::{encode_packet, OutgoingPacket, PacketConfig, MAX_PACKET_LENGTH};
use crate::error::{PacketError, Result};
use crate::packet_type::PacketType;
use crate::reader::transport_to_packet_error;

/// Writes complete packets to any `Write` stream.
pub struct PacketWriter<T> {
    inner: T,
    buf: BytesMut,
    config: PacketConfig,
}

impl<T: Write> PacketWriter<T> {
    /// Create a new packet writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, PacketConfig::default())
    }

    /// Create a new packet writer with explicit configuration.
    pub fn with_config(inner: T, config: PacketConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(1 + MAX_PACKET_LENGTH),
            config,
        }
    }

    /// Write a complete packet (blocking).
    pub fn write_packet(&mut self, packet: &OutgoingPacket) -> Result<()> {
        self.send(packet.packet_type, &packet.fields)
    }

    /// Encode and send one packet.
    ///
    /// Nothing is written if encoding fails.
    pub fn send<F: AsRef<[u8]>>(&mut self, packet_type: PacketType, fields: &[F]) -> Result<()> {
        self.buf.clear();
        encode_packet(packet_type, fields, &mut self.buf)?;
        trace!(
            packet_type = %packet_type,
            length = self.buf.len() - 1,
            "sending packet"
        );

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(PacketError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(PacketError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(PacketError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current packet writer configuration.
    pub fn config(&self) -> &PacketConfig {
        &self.config
    }
}

impl PacketWriter<IcbStream> {
    /// Create a packet writer for `IcbStream` and apply write timeout from config.
    pub fn with_config_stream(inner: IcbStream, config: PacketConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_packet_error)?;
        Ok(Self::with_config(inner, config))
    }
}
