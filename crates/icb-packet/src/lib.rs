//! ICB packet codec and typed message model.
//!
//! Every ICB packet on the wire is framed as:
//! - A 1-byte length (bytes that follow the length byte)
//! - A 1-byte packet type, an ASCII letter `a`..`n`
//! - Zero or more fields separated by `0x01`
//! - A `0x00` terminator
//!
//! Decoding turns that into a [`Message`] whose [`MessageKind`] carries the
//! named fields for its packet type. Encoding goes the other way and refuses
//! anything that would not fit in the one-byte length.

pub mod codec;
pub mod error;
#[cfg(feature = "async")]
pub mod framed;
pub mod message;
pub mod packet_type;
pub mod reader;
pub mod writer;

pub use codec::{
    decode, decode_packet, decode_with_max, encode, encode_packet, encoded_length,
    split_fields, OutgoingPacket, PacketConfig, DEFAULT_MAX_EXTENDED_LENGTH,
    EXTENDED_LENGTH_MARKER, FIELD_SEPARATOR, MAX_PACKET_LENGTH, TERMINATOR,
};
pub use error::{PacketError, Result};
#[cfg(feature = "async")]
pub use framed::IcbCodec;
pub use message::{
    BeepMessage, ChatMessage, ErrorMessage, Message, MessageKind, PingMessage, ProtocolInfo,
    StatusMessage,
};
pub use packet_type::{ParsePacketTypeError, PacketType};
pub use reader::PacketReader;
pub use writer::PacketWriter;
