use std::fmt;
use std::io;

use icb_client::ClientError;
use icb_packet::PacketError;
use icb_transport::TransportError;

// sysexits-style exit codes.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Connect { source, .. } | TransportError::Io(source) => {
            io_error(context, source)
        }
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn packet_error(context: &str, err: PacketError) -> CliError {
    match err {
        PacketError::Io(source) => io_error(context, source),
        PacketError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        err if err.is_encoding() => CliError::new(USAGE, format!("{context}: {err}")),
        err => CliError::new(DATA_INVALID, format!("{context}: {err}")),
    }
}

pub fn client_error(context: &str, err: ClientError) -> CliError {
    match err {
        ClientError::Transport(err) => transport_error(context, err),
        ClientError::Packet(err) => packet_error(context, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_errors_map_to_exit_codes() {
        let too_long = PacketError::TooLong { size: 300, max: 255 };
        assert_eq!(packet_error("encode", too_long).code, USAGE);

        let truncated = PacketError::Truncated {
            expected: 8,
            received: 3,
        };
        assert_eq!(packet_error("decode", truncated).code, DATA_INVALID);

        assert_eq!(
            packet_error("recv", PacketError::ConnectionClosed).code,
            FAILURE
        );
    }

    #[test]
    fn connect_refused_is_failure() {
        let err = ClientError::Transport(TransportError::Connect {
            addr: "127.0.0.1:1".to_string(),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        });
        let cli = client_error("connect failed", err);
        assert_eq!(cli.code, FAILURE);
        assert!(cli.message.starts_with("connect failed: "));
    }

    #[test]
    fn timeouts_map_to_124() {
        let err = PacketError::Io(io::Error::from(io::ErrorKind::TimedOut));
        assert_eq!(packet_error("recv", err).code, TIMEOUT);
    }

    #[test]
    fn shutdown_is_transport_error() {
        assert_eq!(
            transport_error("disconnect", TransportError::Shutdown).code,
            TRANSPORT_ERROR
        );
    }
}
