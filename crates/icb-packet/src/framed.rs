//! `tokio_util::codec` adapter for use with `Framed` streams.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_packet, truncated, OutgoingPacket, DEFAULT_MAX_EXTENDED_LENGTH};
use crate::error::PacketError;
use crate::message::Message;

/// ICB packet codec for `tokio_util::codec::Framed`.
#[derive(Debug, Clone)]
pub struct IcbCodec {
    max_extended_length: usize,
}

impl IcbCodec {
    pub fn new() -> Self {
        Self::with_max_extended_length(DEFAULT_MAX_EXTENDED_LENGTH)
    }

    pub fn with_max_extended_length(max_extended_length: usize) -> Self {
        Self {
            max_extended_length,
        }
    }
}

impl Default for IcbCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for IcbCodec {
    type Item = Message;
    type Error = PacketError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>, PacketError> {
        decode_packet(src, self.max_extended_length)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Message>, PacketError> {
        match self.decode(src)? {
            Some(message) => Ok(Some(message)),
            None if src.is_empty() => Ok(None),
            None => Err(truncated(src)),
        }
    }
}

impl Encoder<OutgoingPacket> for IcbCodec {
    type Error = PacketError;

    fn encode(&mut self, item: OutgoingPacket, dst: &mut BytesMut) -> Result<(), PacketError> {
        item.encode(dst)
    }
}

impl Encoder<&OutgoingPacket> for IcbCodec {
    type Error = PacketError;

    fn encode(&mut self, item: &OutgoingPacket, dst: &mut BytesMut) -> Result<(), PacketError> {
        item.encode(dst)
    }
}
