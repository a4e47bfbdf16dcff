//! Blocking TCP transport for ICB clients.
//!
//! This is the lowest layer of the workspace: it opens a TCP connection to an
//! ICB server and hands back an [`IcbStream`] that implements `Read + Write`.
//! Everything that knows about packets lives one layer up, in `icb-packet`.

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use stream::IcbStream;
pub use tcp::{TcpTransport, DEFAULT_HOST, DEFAULT_PORT};
