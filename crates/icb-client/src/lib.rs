//! Blocking ICB client connection.
//!
//! Connect to a server, log in, and send open messages, commands, pings and
//! pongs. Each call builds the packet fields in protocol order, encodes them,
//! and writes them before returning. [`Connection::recv`] reads one message;
//! what to do with it is up to the caller.

pub mod config;
pub mod connection;
pub mod error;
pub mod options;

pub use config::ConnectionConfig;
pub use connection::{connect, connect_default, Connection};
pub use error::{ClientError, Result};
pub use options::{
    CommandOptions, LoginOptions, ProtocolOptions, DEFAULT_PROTOCOL_LEVEL, LOGIN_COMMAND,
    WHO_COMMAND,
};
