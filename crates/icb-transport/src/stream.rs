use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};

/// A connected ICB stream. Implements `Read` and `Write`.
///
/// Wraps the TCP socket returned by [`crate::TcpTransport::connect`]. The
/// stream carries raw bytes only; packet framing is done by the caller.
pub struct IcbStream {
    inner: TcpStream,
}

impl Read for IcbStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for IcbStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl IcbStream {
    /// Wrap an already connected TCP stream.
    pub fn from_tcp(stream: TcpStream) -> Self {
        Self { inner: stream }
    }

    /// Set read timeout on the underlying socket.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Set write timeout on the underlying socket.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Try to clone this stream (creates a new file descriptor).
    ///
    /// Used to hand one half to a packet reader and the other to a writer.
    pub fn try_clone(&self) -> Result<Self> {
        let cloned = self.inner.try_clone()?;
        Ok(Self::from_tcp(cloned))
    }

    /// Address of the server end of the connection.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        self.inner.peer_addr().map_err(Into::into)
    }

    /// Local address of the connection.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.inner.local_addr().map_err(Into::into)
    }

    /// Shut down both directions of the connection.
    ///
    /// Clones made with [`IcbStream::try_clone`] are shut down as well, since
    /// they share the socket.
    pub fn shutdown(&self) -> Result<()> {
        match self.inner.shutdown(Shutdown::Both) {
            Ok(()) => {
                debug!("transport shut down");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotConnected => Err(TransportError::Shutdown),
            Err(err) => Err(TransportError::Io(err)),
        }
    }
}

impl std::fmt::Debug for IcbStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("IcbStream");
        s.field("type", &"tcp");
        if let Ok(addr) = self.inner.peer_addr() {
            s.field("peer", &addr);
        }
        s.finish()
    }
}
