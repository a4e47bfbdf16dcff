//! Packet type codes.
//!
//! Codes are the ASCII letters `a` through `n`, one per packet kind, in
//! protocol order. Any other byte decodes to [`PacketType::Unknown`].

use std::fmt;
use std::str::FromStr;

/// Login request (client) or login acknowledgement (server).
pub const LOGIN: u8 = b'a';

/// Public message to the current group.
pub const OPEN_MESSAGE: u8 = b'b';

/// Private message between two users.
pub const PERSONAL_MESSAGE: u8 = b'c';

/// Server status notice.
pub const STATUS: u8 = b'd';

/// Server error notice.
pub const ERROR: u8 = b'e';

/// Important server notice.
pub const IMPORTANT: u8 = b'f';

/// Server-initiated disconnect.
pub const EXIT: u8 = b'g';

/// Client command (`/m`, `/g`, ...).
pub const COMMAND: u8 = b'h';

/// Output of a command.
pub const COMMAND_OUTPUT: u8 = b'i';

/// Protocol version handshake.
pub const PROTOCOL: u8 = b'j';

/// Beep from another user.
pub const BEEP: u8 = b'k';

/// Keepalive request.
pub const PING: u8 = b'l';

/// Keepalive reply.
pub const PONG: u8 = b'm';

/// No-op.
pub const NOOP: u8 = b'n';

/// The kind of an ICB packet, as carried in its type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketType {
    Login,
    OpenMessage,
    PersonalMessage,
    Status,
    Error,
    Important,
    Exit,
    Command,
    CommandOutput,
    Protocol,
    Beep,
    Ping,
    Pong,
    Noop,
    /// Any byte outside `a`..`n`, kept verbatim.
    Unknown(u8),
}

impl PacketType {
    /// Every known packet type, in wire-code order.
    pub const ALL: [PacketType; 14] = [
        PacketType::Login,
        PacketType::OpenMessage,
        PacketType::PersonalMessage,
        PacketType::Status,
        PacketType::Error,
        PacketType::Important,
        PacketType::Exit,
        PacketType::Command,
        PacketType::CommandOutput,
        PacketType::Protocol,
        PacketType::Beep,
        PacketType::Ping,
        PacketType::Pong,
        PacketType::Noop,
    ];

    /// Map a wire byte to a packet type. Total over all 256 values.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            LOGIN => PacketType::Login,
            OPEN_MESSAGE => PacketType::OpenMessage,
            PERSONAL_MESSAGE => PacketType::PersonalMessage,
            STATUS => PacketType::Status,
            ERROR => PacketType::Error,
            IMPORTANT => PacketType::Important,
            EXIT => PacketType::Exit,
            COMMAND => PacketType::Command,
            COMMAND_OUTPUT => PacketType::CommandOutput,
            PROTOCOL => PacketType::Protocol,
            BEEP => PacketType::Beep,
            PING => PacketType::Ping,
            PONG => PacketType::Pong,
            NOOP => PacketType::Noop,
            other => PacketType::Unknown(other),
        }
    }

    /// The byte written on the wire for this type.
    pub fn as_byte(self) -> u8 {
        match self {
            PacketType::Login => LOGIN,
            PacketType::OpenMessage => OPEN_MESSAGE,
            PacketType::PersonalMessage => PERSONAL_MESSAGE,
            PacketType::Status => STATUS,
            PacketType::Error => ERROR,
            PacketType::Important => IMPORTANT,
            PacketType::Exit => EXIT,
            PacketType::Command => COMMAND,
            PacketType::CommandOutput => COMMAND_OUTPUT,
            PacketType::Protocol => PROTOCOL,
            PacketType::Beep => BEEP,
            PacketType::Ping => PING,
            PacketType::Pong => PONG,
            PacketType::Noop => NOOP,
            PacketType::Unknown(byte) => byte,
        }
    }

    /// Diagnostic name used in logs and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            PacketType::Login => "LOGIN_PACKET",
            PacketType::OpenMessage => "OPEN_MESSAGE",
            PacketType::PersonalMessage => "PERSONAL_MESSAGE",
            PacketType::Status => "STATUS_MESSAGE",
            PacketType::Error => "ERROR_MESSAGE",
            PacketType::Important => "IMPORTANT_MESSAGE",
            PacketType::Exit => "EXIT_PACKET",
            PacketType::Command => "COMMAND_PACKET",
            PacketType::CommandOutput => "COMMAND_OUTPUT_PACKET",
            PacketType::Protocol => "PROTOCOL_PACKET",
            PacketType::Beep => "BEEP_PACKET",
            PacketType::Ping => "PING_PACKET",
            PacketType::Pong => "PONG_PACKET",
            PacketType::Noop => "NOOP_PACKET",
            PacketType::Unknown(_) => "UNKNOWN",
        }
    }

    /// Returns true unless this is [`PacketType::Unknown`].
    pub fn is_known(self) -> bool {
        !matches!(self, PacketType::Unknown(_))
    }
}

impl From<u8> for PacketType {
    fn from(byte: u8) -> Self {
        PacketType::from_byte(byte)
    }
}

impl From<PacketType> for u8 {
    fn from(packet_type: PacketType) -> Self {
        packet_type.as_byte()
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketType::Unknown(byte) => write!(f, "UNKNOWN(0x{byte:02x})"),
            known => f.write_str(known.name()),
        }
    }
}

/// Error returned when a string names no packet type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown packet type name: {0}")]
pub struct ParsePacketTypeError(pub String);

impl FromStr for PacketType {
    type Err = ParsePacketTypeError;

    /// Accepts the wire letter (`b`), the diagnostic name (`OPEN_MESSAGE`),
    /// or a short name (`open`, `open-message`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let [byte] = trimmed.as_bytes() {
            let packet_type = PacketType::from_byte(*byte);
            if packet_type.is_known() {
                return Ok(packet_type);
            }
        }

        let normalized = trimmed.to_ascii_lowercase().replace('-', "_");
        let packet_type = match normalized.as_str() {
            "login" | "login_packet" => PacketType::Login,
            "open" | "open_message" => PacketType::OpenMessage,
            "personal" | "personal_message" => PacketType::PersonalMessage,
            "status" | "status_message" => PacketType::Status,
            "error" | "error_message" => PacketType::Error,
            "important" | "important_message" => PacketType::Important,
            "exit" | "exit_packet" => PacketType::Exit,
            "command" | "command_packet" => PacketType::Command,
            "command_output" | "command_output_packet" => PacketType::CommandOutput,
            "protocol" | "protocol_packet" => PacketType::Protocol,
            "beep" | "beep_packet" => PacketType::Beep,
            "ping" | "ping_packet" => PacketType::Ping,
            "pong" | "pong_packet" => PacketType::Pong,
            "noop" | "noop_packet" => PacketType::Noop,
            _ => return Err(ParsePacketTypeError(s.to_string())),
        };
        Ok(packet_type)
    }
}
