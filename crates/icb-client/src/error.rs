/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] icb_transport::TransportError),

    /// Packet-level error.
    #[error("packet error: {0}")]
    Packet(#[from] icb_packet::PacketError),
}

impl ClientError {
    /// True when the server closed the connection between packets.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            ClientError::Packet(icb_packet::PacketError::ConnectionClosed)
        )
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
