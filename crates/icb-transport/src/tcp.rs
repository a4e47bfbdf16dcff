use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::IcbStream;

/// Default ICB server host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default ICB server port.
pub const DEFAULT_PORT: u16 = 7326;

/// TCP transport to an ICB server.
///
/// Resolves `host:port`, tries each resolved address in turn, and returns the
/// first stream that connects.
pub struct TcpTransport;

impl TcpTransport {
    /// Connect to `host:port` (blocking, no connect timeout).
    pub fn connect(host: &str, port: u16) -> Result<IcbStream> {
        Self::connect_with_timeout(host, port, None)
    }

    /// Connect to the default server, `127.0.0.1:7326`.
    pub fn connect_default() -> Result<IcbStream> {
        Self::connect(DEFAULT_HOST, DEFAULT_PORT)
    }

    /// Connect to `host:port`, bounding each connection attempt by `timeout`.
    pub fn connect_with_timeout(
        host: &str,
        port: u16,
        timeout: Option<Duration>,
    ) -> Result<IcbStream> {
        let addr = format!("{host}:{port}");
        let candidates: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|e| TransportError::Resolve {
                addr: addr.clone(),
                source: e,
            })?
            .collect();

        if candidates.is_empty() {
            return Err(TransportError::Resolve {
                addr,
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "host resolved to no addresses",
                ),
            });
        }

        let mut last_err = None;
        for candidate in candidates {
            let attempt = match timeout {
                Some(timeout) => TcpStream::connect_timeout(&candidate, timeout),
                None => TcpStream::connect(candidate),
            };
            match attempt {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    info!(%addr, peer = %candidate, "connected to icb server");
                    return Ok(IcbStream::from_tcp(stream));
                }
                Err(err) => {
                    debug!(peer = %candidate, error = %err, "connect attempt failed");
                    last_err = Some(err);
                }
            }
        }

        Err(TransportError::Connect {
            addr,
            source: last_err.unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotConnected, "no connection attempt made")
            }),
        })
    }

    /// Transport name for diagnostics.
    pub fn transport_name() -> &'static str {
        "tcp"
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn test_connect_write_read() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = std::thread::spawn(move || {
            let (mut server, _) = listener.accept().unwrap();
            let mut buf = [0u8; 5];
            server.read_exact(&mut buf).unwrap();
            server.write_all(&buf).unwrap();
        });

        let mut client = TcpTransport::connect("127.0.0.1", port).unwrap();
        client.write_all(b"hello").unwrap();
        let mut echoed = [0u8; 5];
        client.read_exact(&mut echoed).unwrap();
        assert_eq!(&echoed, b"hello");

        handle.join().unwrap();
    }

    #[test]
    fn test_connect_refused() {
        // Bind then drop to find a port with nothing listening on it.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = TcpTransport::connect("127.0.0.1", port).unwrap_err();
        match err {
            TransportError::Connect { addr, .. } => assert_eq!(addr, format!("127.0.0.1:{port}")),
            other => panic!("expected Connect error, got {other:?}"),
        }
    }

    #[test]
    fn test_connect_with_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let stream =
            TcpTransport::connect_with_timeout("127.0.0.1", port, Some(Duration::from_secs(2)))
                .unwrap();
        let (_server, client_addr) = listener.accept().unwrap();
        assert_eq!(stream.local_addr().unwrap(), client_addr);
        assert_eq!(stream.peer_addr().unwrap().port(), port);
    }

    #[test]
    fn test_clone_and_timeouts() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let stream = TcpTransport::connect("127.0.0.1", port).unwrap();
        let _server = listener.accept().unwrap();

        let clone = stream.try_clone().unwrap();
        clone
            .set_read_timeout(Some(Duration::from_millis(10)))
            .unwrap();
        stream
            .set_write_timeout(Some(Duration::from_millis(10)))
            .unwrap();
        assert_eq!(clone.peer_addr().unwrap(), stream.peer_addr().unwrap());
    }

    #[test]
    fn test_shutdown_reaches_server() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let stream = TcpTransport::connect("127.0.0.1", port).unwrap();
        let (mut server, _) = listener.accept().unwrap();

        stream.shutdown().unwrap();
        let mut buf = [0u8; 1];
        assert_eq!(server.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_debug_names_transport() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let stream = TcpTransport::connect("127.0.0.1", port).unwrap();
        assert!(format!("{stream:?}").contains("tcp"));
        assert_eq!(TcpTransport::transport_name(), "tcp");
    }
}
