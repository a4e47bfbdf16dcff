//! Client side of the ICB (Internet Citizen's Band) chat protocol.
//!
//! # Crate Structure
//!
//! - [`transport`]: blocking TCP stream to the server
//! - [`packet`]: packet codec, typed message model, packet reader/writer
//! - [`client`]: `Connection` with login, messages, commands, ping/pong
//!
//! The `cli` feature builds the `icb` binary; `async` enables
//! [`packet::IcbCodec`] for `tokio_util::codec::Framed`.

/// Re-export transport types.
pub mod transport {
    pub use icb_transport::*;
}

/// Re-export packet types.
pub mod packet {
    pub use icb_packet::*;
}

/// Re-export client types.
pub mod client {
    pub use icb_client::*;
}

pub use icb_client::{connect, Connection, ConnectionConfig};
pub use icb_packet::{decode, encode, Message, MessageKind, PacketType};
