/// Errors that can occur during packet encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    /// The encoded packet would not fit in the one-byte length field.
    #[error("packet too long ({size} bytes, max {max})")]
    TooLong { size: usize, max: usize },

    /// A field contains the `0x01` separator and would split on the wire.
    #[error("field {index} contains the 0x01 field separator")]
    FieldContainsSeparator { index: usize },

    /// An extended packet declared a length above the configured maximum.
    #[error("extended packet too long ({size} bytes, max {max})")]
    ExtendedTooLong { size: usize, max: usize },

    /// An extended packet declared a length of zero, leaving no type byte.
    #[error("packet has no type byte")]
    MissingType,

    /// The stream ended part way through a packet.
    #[error("truncated packet (received {received} of {expected} bytes)")]
    Truncated { expected: usize, received: usize },

    /// The connection was closed before the first byte of a packet.
    #[error("connection closed")]
    ConnectionClosed,

    /// An I/O error occurred while reading or writing packets.
    #[error("packet I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PacketError {
    /// True for errors raised while building an outgoing packet.
    pub fn is_encoding(&self) -> bool {
        matches!(
            self,
            PacketError::TooLong { .. } | PacketError::FieldContainsSeparator { .. }
        )
    }

    /// True for errors raised because incoming bytes did not form a packet.
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            PacketError::ExtendedTooLong { .. }
                | PacketError::MissingType
                | PacketError::Truncated { .. }
                | PacketError::ConnectionClosed
        )
    }
}

pub type Result<T> = std::result::Result<T, PacketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_error_kinds() {
        assert!(PacketError::TooLong { size: 256, max: 255 }.is_encoding());
        assert!(PacketError::FieldContainsSeparator { index: 0 }.is_encoding());
        assert!(PacketError::ConnectionClosed.is_framing());
        assert!(PacketError::Truncated {
            expected: 4,
            received: 2
        }
        .is_framing());

        let io = PacketError::from(std::io::Error::other("boom"));
        assert!(!io.is_encoding());
        assert!(!io.is_framing());
    }

    #[test]
    fn messages_name_the_limit() {
        let err = PacketError::TooLong {
            size: 300,
            max: 255,
        };
        assert_eq!(err.to_string(), "packet too long (300 bytes, max 255)");
    }
}
