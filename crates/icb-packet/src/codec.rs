use std::io::{ErrorKind, Read};
use std::time::Duration;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{PacketError, Result};
use crate::message::Message;
use crate::packet_type::PacketType;

/// Separator between fields in a packet payload.
pub const FIELD_SEPARATOR: u8 = 0x01;

/// Byte that ends every packet written by this codec.
pub const TERMINATOR: u8 = 0x00;

/// A length byte of zero announces a 4-byte big-endian extended length.
pub const EXTENDED_LENGTH_MARKER: u8 = 0x00;

/// Largest length a one-byte length prefix can declare.
pub const MAX_PACKET_LENGTH: usize = u8::MAX as usize;

/// Default upper bound for extended packets: 64 KiB.
pub const DEFAULT_MAX_EXTENDED_LENGTH: usize = 64 * 1024;

const EXTENDED_HEADER_SIZE: usize = 5;

/// An outgoing packet: a type and its fields in protocol order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingPacket {
    pub packet_type: PacketType,
    pub fields: Vec<Bytes>,
}

impl OutgoingPacket {
    /// Create a packet from any list of byte-like fields.
    pub fn new<I, F>(packet_type: PacketType, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Bytes>,
    {
        Self {
            packet_type,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a packet with no fields.
    pub fn empty(packet_type: PacketType) -> Self {
        Self {
            packet_type,
            fields: Vec::new(),
        }
    }

    /// The value the length byte will carry.
    pub fn length(&self) -> usize {
        encoded_length(&self.fields)
    }

    /// The total wire size of this packet (length byte included).
    pub fn wire_size(&self) -> usize {
        1 + self.length()
    }

    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        encode_packet(self.packet_type, &self.fields, dst)
    }
}

/// Length byte value for a packet carrying `fields`.
///
/// Counts the type byte, the fields, the separators between them and the
/// terminator. The result may exceed [`MAX_PACKET_LENGTH`].
pub fn encoded_length<F: AsRef<[u8]>>(fields: &[F]) -> usize {
    let field_bytes: usize = fields.iter().map(|f| f.as_ref().len()).sum();
    let separators = fields.len().saturating_sub(1);
    1 + field_bytes + separators + 1
}

/// Encode a packet into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────┬──────────┬─────────┬──────┬─────────┬─────┬──────────┐
/// │ Length   │ Type     │ Field 1 │ 0x01 │ Field 2 │ ... │ 0x00     │
/// │ (1B)     │ (1B a-n) │         │      │         │     │ (1B)     │
/// └──────────┴──────────┴─────────┴──────┴─────────┴─────┴──────────┘
/// ```
///
/// Length counts every byte after itself and must not exceed 255. Fields are
/// written as given; their order carries their meaning.
pub fn encode_packet<F: AsRef<[u8]>>(
    packet_type: PacketType,
    fields: &[F],
    dst: &mut BytesMut,
) -> Result<()> {
    if let Some(index) = fields
        .iter()
        .position(|f| f.as_ref().contains(&FIELD_SEPARATOR))
    {
        return Err(PacketError::FieldContainsSeparator { index });
    }

    let length = encoded_length(fields);
    if length > MAX_PACKET_LENGTH {
        return Err(PacketError::TooLong {
            size: length,
            max: MAX_PACKET_LENGTH,
        });
    }

    dst.reserve(1 + length);
    dst.put_u8(length as u8);
    dst.put_u8(packet_type.as_byte());
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            dst.put_u8(FIELD_SEPARATOR);
        }
        dst.put_slice(field.as_ref());
    }
    dst.put_u8(TERMINATOR);
    Ok(())
}

/// Encode a packet into a fresh buffer.
pub fn encode<F: AsRef<[u8]>>(packet_type: PacketType, fields: &[F]) -> Result<Bytes> {
    let mut dst = BytesMut::new();
    encode_packet(packet_type, fields, &mut dst)?;
    Ok(dst.freeze())
}

/// Split a packet payload into its fields.
///
/// A single trailing terminator is dropped first. An empty payload has no
/// fields; a payload without separators is one field.
pub fn split_fields(mut payload: Bytes) -> Vec<Bytes> {
    if payload.last() == Some(&TERMINATOR) {
        payload.truncate(payload.len() - 1);
    }
    if payload.is_empty() {
        return Vec::new();
    }

    let mut fields = Vec::new();
    while let Some(pos) = payload.iter().position(|&b| b == FIELD_SEPARATOR) {
        fields.push(payload.split_to(pos));
        payload.advance(1);
    }
    fields.push(payload);
    fields
}

/// Total bytes the packet at the front of `src` occupies, if its header is
/// complete.
fn declared_total(src: &[u8]) -> Option<usize> {
    match src.first()? {
        &EXTENDED_LENGTH_MARKER => {
            let header: [u8; 4] = src.get(1..EXTENDED_HEADER_SIZE)?.try_into().ok()?;
            Some(EXTENDED_HEADER_SIZE + u32::from_be_bytes(header) as usize)
        }
        &length => Some(1 + length as usize),
    }
}

fn check_extended(length: usize, max_extended_length: usize) -> Result<()> {
    if length == 0 {
        return Err(PacketError::MissingType);
    }
    if length > max_extended_length {
        return Err(PacketError::ExtendedTooLong {
            size: length,
            max: max_extended_length,
        });
    }
    Ok(())
}

/// Build a message from the bytes that follow the length prefix.
fn parse_body(length: usize, mut body: Bytes) -> Message {
    let type_byte = body.get_u8();
    Message::new(length as u32, type_byte, split_fields(body))
}

/// Decode a packet from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete packet yet.
/// On success, consumes the packet bytes from the buffer.
pub fn decode_packet(src: &mut BytesMut, max_extended_length: usize) -> Result<Option<Message>> {
    let Some(&prefix) = src.first() else {
        return Ok(None);
    };

    let (header_size, length) = if prefix == EXTENDED_LENGTH_MARKER {
        if src.len() < EXTENDED_HEADER_SIZE {
            return Ok(None);
        }
        let length = u32::from_be_bytes([src[1], src[2], src[3], src[4]]) as usize;
        check_extended(length, max_extended_length)?;
        (EXTENDED_HEADER_SIZE, length)
    } else {
        (1, prefix as usize)
    };

    if src.len() < header_size + length {
        return Ok(None);
    }

    src.advance(header_size);
    let body = src.split_to(length).freeze();
    Ok(Some(parse_body(length, body)))
}

/// Fill as much of `buf` as the source provides. Returns bytes read.
fn fill<R: Read>(src: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match src.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(PacketError::Io(err)),
        }
    }
    Ok(filled)
}

/// Read exactly one packet from a byte source (blocking).
///
/// Reads only the bytes of that packet, so the source can be handed back to
/// the caller positioned at the next one.
pub fn decode<R: Read>(src: &mut R) -> Result<Message> {
    decode_with_max(src, DEFAULT_MAX_EXTENDED_LENGTH)
}

/// Like [`decode`], with an explicit bound on extended packet length.
pub fn decode_with_max<R: Read>(src: &mut R, max_extended_length: usize) -> Result<Message> {
    let mut prefix = [0u8; 1];
    if fill(src, &mut prefix)? == 0 {
        return Err(PacketError::ConnectionClosed);
    }

    let mut header_size = 1usize;
    let length = if prefix[0] == EXTENDED_LENGTH_MARKER {
        let mut extended = [0u8; 4];
        let read = fill(src, &mut extended)?;
        if read < extended.len() {
            return Err(PacketError::Truncated {
                expected: EXTENDED_HEADER_SIZE,
                received: 1 + read,
            });
        }
        header_size = EXTENDED_HEADER_SIZE;
        let length = u32::from_be_bytes(extended) as usize;
        check_extended(length, max_extended_length)?;
        length
    } else {
        prefix[0] as usize
    };

    let mut body = BytesMut::zeroed(length);
    let read = fill(src, &mut body)?;
    if read < length {
        return Err(PacketError::Truncated {
            expected: header_size + length,
            received: header_size + read,
        });
    }

    Ok(parse_body(length, body.freeze()))
}

/// Error for a buffer that ended before its packet did.
pub(crate) fn truncated(src: &[u8]) -> PacketError {
    match declared_total(src) {
        Some(expected) => PacketError::Truncated {
            expected,
            received: src.len(),
        },
        None if src.is_empty() => PacketError::ConnectionClosed,
        None => PacketError::Truncated {
            expected: EXTENDED_HEADER_SIZE,
            received: src.len(),
        },
    }
}

/// Configuration for packet readers and writers.
#[derive(Debug, Clone)]
pub struct PacketConfig {
    /// Maximum length accepted for extended packets. Default: 64 KiB.
    pub max_extended_length: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<Duration>,
}

impl Default for PacketConfig {
    fn default() -> Self {
        Self {
            max_extended_length: DEFAULT_MAX_EXTENDED_LENGTH,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::message::MessageKind;

    #[test]
    fn test_encode_exact_bytes() {
        let wire = encode(PacketType::OpenMessage, &[&b"alice"[..], &b"hi"[..]]).unwrap();
        assert_eq!(wire.as_ref(), b"\x0abalice\x01hi\x00");
        assert_eq!(wire[0] as usize, wire.len() - 1);
    }

    #[test]
    fn test_encode_no_fields() {
        let wire = encode::<&[u8]>(PacketType::Ping, &[]).unwrap();
        assert_eq!(wire.as_ref(), b"\x02l\x00");
    }

    #[test]
    fn test_ping_roundtrip_has_no_fields() {
        let wire = encode::<&[u8]>(PacketType::Ping, &[]).unwrap();
        let msg = decode(&mut Cursor::new(wire)).unwrap();
        assert_eq!(msg.packet_type(), PacketType::Ping);
        assert!(msg.fields().is_empty());
        assert_eq!(msg.identifier(), None);
    }

    #[test]
    fn test_open_message_roundtrip() {
        let wire = encode(PacketType::OpenMessage, &["alice", "hello world"]).unwrap();
        let msg = decode(&mut Cursor::new(wire)).unwrap();
        assert_eq!(msg.packet_type(), PacketType::OpenMessage);
        assert_eq!(msg.from(), Some(&b"alice"[..]));
        assert_eq!(msg.body(), Some(&b"hello world"[..]));
    }

    #[test]
    fn test_roundtrip_every_type() {
        let fields = ["one", "", "three"];
        for packet_type in PacketType::ALL {
            let wire = encode(packet_type, &fields).unwrap();
            let msg = decode(&mut Cursor::new(wire)).unwrap();
            assert_eq!(msg.packet_type(), packet_type);
            assert_eq!(msg.fields(), &["one", "", "three"][..]);
        }
    }

    #[test]
    fn test_length_boundary() {
        // type + 253 field bytes + terminator = 255
        let fits = vec![b'x'; 253];
        let wire = encode(PacketType::OpenMessage, &[&fits]).unwrap();
        assert_eq!(wire[0], 255);
        assert_eq!(wire.len(), 256);

        let too_long = vec![b'x'; 254];
        let err = encode(PacketType::OpenMessage, &[&too_long]).unwrap_err();
        assert!(matches!(err, PacketError::TooLong { size: 256, max: 255 }));
        assert!(err.is_encoding());
    }

    #[test]
    fn test_length_boundary_counts_separators() {
        // 1 + (126 + 1 + 126) + 1 = 255
        let half = vec![b'y'; 126];
        assert!(encode(PacketType::OpenMessage, &[&half, &half]).is_ok());

        let over = vec![b'y'; 127];
        assert!(encode(PacketType::OpenMessage, &[&half, &over]).is_err());
    }

    #[test]
    fn test_encode_rejects_separator_in_field() {
        let err = encode(PacketType::OpenMessage, &[&b"ok"[..], &b"bad\x01field"[..]]).unwrap_err();
        assert!(matches!(err, PacketError::FieldContainsSeparator { index: 1 }));
    }

    #[test]
    fn test_encode_failure_leaves_buffer_untouched() {
        let mut buf = BytesMut::new();
        let big = vec![0u8; 300];
        assert!(encode_packet(PacketType::Command, &[&big], &mut buf).is_err());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_type_byte_only() {
        let msg = decode(&mut Cursor::new(b"\x01n".to_vec())).unwrap();
        assert_eq!(msg.length(), 1);
        assert_eq!(msg.packet_type(), PacketType::Noop);
        assert!(msg.fields().is_empty());
    }

    #[test]
    fn test_decode_without_separator_is_single_field() {
        let msg = decode(&mut Cursor::new(b"\x08ewhoops\x00".to_vec())).unwrap();
        assert_eq!(msg.fields(), &["whoops"][..]);
        assert_eq!(msg.body(), Some(&b"whoops"[..]));

        // Servers that omit the terminator still decode.
        let msg = decode(&mut Cursor::new(b"\x07ewhoops".to_vec())).unwrap();
        assert_eq!(msg.fields(), &["whoops"][..]);
    }

    #[test]
    fn test_decode_unknown_type() {
        let msg = decode(&mut Cursor::new(b"\x05zabc\x00".to_vec())).unwrap();
        assert_eq!(msg.packet_type(), PacketType::Unknown(0x7A));
        assert_eq!(msg.kind(), &MessageKind::Unknown(0x7A));
        assert_eq!(msg.fields(), &["abc"][..]);
        assert_eq!(msg.body(), None);
    }

    #[test]
    fn test_decode_truncated() {
        let err = decode(&mut Cursor::new(b"\x0abalice".to_vec())).unwrap_err();
        assert!(matches!(
            err,
            PacketError::Truncated {
                expected: 11,
                received: 7
            }
        ));
        assert!(err.is_framing());
    }

    #[test]
    fn test_decode_empty_source() {
        let err = decode(&mut Cursor::new(Vec::<u8>::new())).unwrap_err();
        assert!(matches!(err, PacketError::ConnectionClosed));
    }

    #[test]
    fn test_decode_reads_one_packet_at_a_time() {
        let mut wire = BytesMut::new();
        encode_packet(PacketType::Ping, &["1"], &mut wire).unwrap();
        encode_packet(PacketType::Pong, &["2"], &mut wire).unwrap();

        let mut src = Cursor::new(wire.to_vec());
        assert_eq!(decode(&mut src).unwrap().identifier(), Some(&b"1"[..]));
        assert_eq!(decode(&mut src).unwrap().identifier(), Some(&b"2"[..]));
        assert!(matches!(
            decode(&mut src).unwrap_err(),
            PacketError::ConnectionClosed
        ));
    }

    #[test]
    fn test_decode_extended_length() {
        let mut wire = vec![0x00];
        wire.extend_from_slice(&300u32.to_be_bytes());
        wire.push(b'b');
        wire.extend_from_slice(b"alice\x01");
        wire.extend(std::iter::repeat_n(b'z', 300 - 1 - 6 - 1));
        wire.push(0x00);

        let msg = decode(&mut Cursor::new(wire.clone())).unwrap();
        assert_eq!(msg.length(), 300);
        assert_eq!(msg.from(), Some(&b"alice"[..]));
        assert_eq!(msg.body().map(<[u8]>::len), Some(292));

        let mut buf = BytesMut::from(&wire[..]);
        let msg = decode_packet(&mut buf, DEFAULT_MAX_EXTENDED_LENGTH)
            .unwrap()
            .unwrap();
        assert_eq!(msg.length(), 300);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_extended_length_limits() {
        let mut wire = vec![0x00];
        wire.extend_from_slice(&1_000_000u32.to_be_bytes());
        let err = decode(&mut Cursor::new(wire)).unwrap_err();
        assert!(matches!(err, PacketError::ExtendedTooLong { .. }));

        let wire = vec![0x00, 0, 0, 0, 0];
        let err = decode(&mut Cursor::new(wire)).unwrap_err();
        assert!(matches!(err, PacketError::MissingType));

        let err = decode(&mut Cursor::new(vec![0x00, 0x00])).unwrap_err();
        assert!(matches!(
            err,
            PacketError::Truncated {
                expected: 5,
                received: 2
            }
        ));
    }

    #[test]
    fn test_decode_packet_incomplete() {
        let mut buf = BytesMut::new();
        assert!(decode_packet(&mut buf, DEFAULT_MAX_EXTENDED_LENGTH)
            .unwrap()
            .is_none());

        encode_packet(PacketType::Status, &["Arrive", "bob"], &mut buf).unwrap();
        let full = buf.len();
        buf.truncate(full - 2);
        assert!(decode_packet(&mut buf, DEFAULT_MAX_EXTENDED_LENGTH)
            .unwrap()
            .is_none());
        assert_eq!(buf.len(), full - 2);

        let mut ext = BytesMut::from(&[0x00, 0x00, 0x01][..]);
        assert!(decode_packet(&mut ext, DEFAULT_MAX_EXTENDED_LENGTH)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_decode_packet_multiple() {
        let mut buf = BytesMut::new();
        encode_packet(PacketType::Status, &["Status", "first"], &mut buf).unwrap();
        encode_packet(PacketType::Important, &["Drop", "second"], &mut buf).unwrap();

        let first = decode_packet(&mut buf, DEFAULT_MAX_EXTENDED_LENGTH)
            .unwrap()
            .unwrap();
        let second = decode_packet(&mut buf, DEFAULT_MAX_EXTENDED_LENGTH)
            .unwrap()
            .unwrap();

        assert_eq!(first.body(), Some(&b"first"[..]));
        assert_eq!(second.category(), Some(&b"Drop"[..]));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_split_fields() {
        assert!(split_fields(Bytes::new()).is_empty());
        assert!(split_fields(Bytes::from_static(b"\x00")).is_empty());
        assert_eq!(split_fields(Bytes::from_static(b"a\x01\x01b")), vec!["a", "", "b"]);
        assert_eq!(split_fields(Bytes::from_static(b"a\x01")), vec!["a", ""]);
    }

    #[test]
    fn test_truncated_reports_declared_size() {
        assert!(matches!(truncated(&[]), PacketError::ConnectionClosed));
        assert!(matches!(
            truncated(&[4, b'b', b'x']),
            PacketError::Truncated {
                expected: 5,
                received: 3
            }
        ));
        assert!(matches!(
            truncated(&[0, 0]),
            PacketError::Truncated {
                expected: 5,
                received: 2
            }
        ));
    }

    #[test]
    fn test_outgoing_packet() {
        let packet = OutgoingPacket::new(PacketType::Beep, [Bytes::from_static(b"dave")]);
        assert_eq!(packet.length(), 6);
        assert_eq!(packet.wire_size(), 7);

        let mut buf = BytesMut::new();
        packet.encode(&mut buf).unwrap();
        assert_eq!(buf.as_ref(), b"\x06kdave\x00");

        let empty = OutgoingPacket::empty(PacketType::Noop);
        assert_eq!(empty.wire_size(), 3);
    }
}
