//! Decoded ICB messages.
//!
//! A [`Message`] keeps the raw, position-significant field list it was decoded
//! from and a [`MessageKind`] built from it once, at decode time. Packet types
//! that share a layout share a shape struct: open and personal messages are
//! both [`ChatMessage`]s, status and important notices are both
//! [`StatusMessage`]s, and ping and pong are both [`PingMessage`]s.
//!
//! Missing trailing fields read as `None`. Nothing here can fail.

use bytes::Bytes;

use crate::packet_type::PacketType;

fn field(fields: &[Bytes], index: usize) -> Option<Bytes> {
    fields.get(index).cloned()
}

/// Open or personal message: `from`, `body`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatMessage {
    from: Option<Bytes>,
    body: Option<Bytes>,
}

impl ChatMessage {
    fn from_fields(fields: &[Bytes]) -> Self {
        Self {
            from: field(fields, 0),
            body: field(fields, 1),
        }
    }

    /// Nickname of the sender.
    pub fn from(&self) -> Option<&[u8]> {
        self.from.as_deref()
    }

    /// Message text.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

/// Status or important notice: `category`, `body`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusMessage {
    category: Option<Bytes>,
    body: Option<Bytes>,
}

impl StatusMessage {
    fn from_fields(fields: &[Bytes]) -> Self {
        Self {
            category: field(fields, 0),
            body: field(fields, 1),
        }
    }

    /// Notice category, e.g. `Status`, `Arrive`, `Sign-off`.
    pub fn category(&self) -> Option<&[u8]> {
        self.category.as_deref()
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

/// Error notice: `body`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMessage {
    body: Option<Bytes>,
}

impl ErrorMessage {
    fn from_fields(fields: &[Bytes]) -> Self {
        Self {
            body: field(fields, 0),
        }
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

/// Protocol packet: `level`, `host_id`, `server_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolInfo {
    level: Option<Bytes>,
    host_id: Option<Bytes>,
    server_id: Option<Bytes>,
}

impl ProtocolInfo {
    fn from_fields(fields: &[Bytes]) -> Self {
        Self {
            level: field(fields, 0),
            host_id: field(fields, 1),
            server_id: field(fields, 2),
        }
    }

    /// Protocol level spoken by the server.
    pub fn level(&self) -> Option<&[u8]> {
        self.level.as_deref()
    }

    pub fn host_id(&self) -> Option<&[u8]> {
        self.host_id.as_deref()
    }

    pub fn server_id(&self) -> Option<&[u8]> {
        self.server_id.as_deref()
    }
}

/// Beep: `from`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeepMessage {
    from: Option<Bytes>,
}

impl BeepMessage {
    fn from_fields(fields: &[Bytes]) -> Self {
        Self {
            from: field(fields, 0),
        }
    }

    pub fn from(&self) -> Option<&[u8]> {
        self.from.as_deref()
    }
}

/// Ping or pong: `identifier`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PingMessage {
    identifier: Option<Bytes>,
}

impl PingMessage {
    fn from_fields(fields: &[Bytes]) -> Self {
        Self {
            identifier: field(fields, 0),
        }
    }

    /// Identifier to echo back in the matching pong.
    pub fn identifier(&self) -> Option<&[u8]> {
        self.identifier.as_deref()
    }
}

/// The typed view of a message, one variant per packet type.
///
/// Login, exit, command, command-output and no-op packets carry no named
/// fields; read them through [`Message::fields`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    Login,
    OpenMessage(ChatMessage),
    PersonalMessage(ChatMessage),
    Status(StatusMessage),
    Error(ErrorMessage),
    Important(StatusMessage),
    Exit,
    Command,
    CommandOutput,
    Protocol(ProtocolInfo),
    Beep(BeepMessage),
    Ping(PingMessage),
    Pong(PingMessage),
    Noop,
    Unknown(u8),
}

impl MessageKind {
    /// Map a positional field list to the named fields of `packet_type`.
    pub fn from_fields(packet_type: PacketType, fields: &[Bytes]) -> Self {
        match packet_type {
            PacketType::Login => MessageKind::Login,
            PacketType::OpenMessage => MessageKind::OpenMessage(ChatMessage::from_fields(fields)),
            PacketType::PersonalMessage => {
                MessageKind::PersonalMessage(ChatMessage::from_fields(fields))
            }
            PacketType::Status => MessageKind::Status(StatusMessage::from_fields(fields)),
            PacketType::Error => MessageKind::Error(ErrorMessage::from_fields(fields)),
            PacketType::Important => MessageKind::Important(StatusMessage::from_fields(fields)),
            PacketType::Exit => MessageKind::Exit,
            PacketType::Command => MessageKind::Command,
            PacketType::CommandOutput => MessageKind::CommandOutput,
            PacketType::Protocol => MessageKind::Protocol(ProtocolInfo::from_fields(fields)),
            PacketType::Beep => MessageKind::Beep(BeepMessage::from_fields(fields)),
            PacketType::Ping => MessageKind::Ping(PingMessage::from_fields(fields)),
            PacketType::Pong => MessageKind::Pong(PingMessage::from_fields(fields)),
            PacketType::Noop => MessageKind::Noop,
            PacketType::Unknown(byte) => MessageKind::Unknown(byte),
        }
    }

    pub fn packet_type(&self) -> PacketType {
        match self {
            MessageKind::Login => PacketType::Login,
            MessageKind::OpenMessage(_) => PacketType::OpenMessage,
            MessageKind::PersonalMessage(_) => PacketType::PersonalMessage,
            MessageKind::Status(_) => PacketType::Status,
            MessageKind::Error(_) => PacketType::Error,
            MessageKind::Important(_) => PacketType::Important,
            MessageKind::Exit => PacketType::Exit,
            MessageKind::Command => PacketType::Command,
            MessageKind::CommandOutput => PacketType::CommandOutput,
            MessageKind::Protocol(_) => PacketType::Protocol,
            MessageKind::Beep(_) => PacketType::Beep,
            MessageKind::Ping(_) => PacketType::Ping,
            MessageKind::Pong(_) => PacketType::Pong,
            MessageKind::Noop => PacketType::Noop,
            MessageKind::Unknown(byte) => PacketType::Unknown(*byte),
        }
    }

    /// Returns true if this variant exposes named fields.
    pub fn has_typed_accessors(&self) -> bool {
        matches!(
            self,
            MessageKind::OpenMessage(_)
                | MessageKind::PersonalMessage(_)
                | MessageKind::Status(_)
                | MessageKind::Error(_)
                | MessageKind::Important(_)
                | MessageKind::Protocol(_)
                | MessageKind::Beep(_)
                | MessageKind::Ping(_)
                | MessageKind::Pong(_)
        )
    }
}

/// One decoded ICB packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    length: u32,
    fields: Vec<Bytes>,
    kind: MessageKind,
}

impl Message {
    /// Build a message from its declared length, type byte and fields.
    pub fn new(length: u32, type_byte: u8, fields: Vec<Bytes>) -> Self {
        let kind = MessageKind::from_fields(PacketType::from_byte(type_byte), &fields);
        Self {
            length,
            fields,
            kind,
        }
    }

    /// Declared length, as read from the packet's length prefix.
    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn packet_type(&self) -> PacketType {
        self.kind.packet_type()
    }

    pub fn kind(&self) -> &MessageKind {
        &self.kind
    }

    /// Raw fields in wire order.
    pub fn fields(&self) -> &[Bytes] {
        &self.fields
    }

    /// Raw field at `index`, or `None` past the end.
    pub fn field(&self, index: usize) -> Option<&[u8]> {
        self.fields.get(index).map(|f| f.as_ref())
    }

    pub fn into_fields(self) -> Vec<Bytes> {
        self.fields
    }

    pub fn from(&self) -> Option<&[u8]> {
        match &self.kind {
            MessageKind::OpenMessage(chat) | MessageKind::PersonalMessage(chat) => chat.from(),
            MessageKind::Beep(beep) => beep.from(),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&[u8]> {
        match &self.kind {
            MessageKind::OpenMessage(chat) | MessageKind::PersonalMessage(chat) => chat.body(),
            MessageKind::Status(status) | MessageKind::Important(status) => status.body(),
            MessageKind::Error(error) => error.body(),
            _ => None,
        }
    }

    pub fn category(&self) -> Option<&[u8]> {
        match &self.kind {
            MessageKind::Status(status) | MessageKind::Important(status) => status.category(),
            _ => None,
        }
    }

    pub fn level(&self) -> Option<&[u8]> {
        match &self.kind {
            MessageKind::Protocol(info) => info.level(),
            _ => None,
        }
    }

    pub fn host_id(&self) -> Option<&[u8]> {
        match &self.kind {
            MessageKind::Protocol(info) => info.host_id(),
            _ => None,
        }
    }

    pub fn server_id(&self) -> Option<&[u8]> {
        match &self.kind {
            MessageKind::Protocol(info) => info.server_id(),
            _ => None,
        }
    }

    pub fn identifier(&self) -> Option<&[u8]> {
        match &self.kind {
            MessageKind::Ping(ping) | MessageKind::Pong(ping) => ping.identifier(),
            _ => None,
        }
    }
}
