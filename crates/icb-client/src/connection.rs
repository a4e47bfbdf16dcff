use std::fmt;
use std::time::Duration;

use icb_packet::{Message, PacketReader, PacketType, PacketWriter};
use icb_transport::{IcbStream, TcpTransport};
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::options::{CommandOptions, LoginOptions, ProtocolOptions};

/// Connect to the server named in `config`.
pub fn connect(config: &ConnectionConfig) -> Result<Connection> {
    let stream =
        TcpTransport::connect_with_timeout(&config.host, config.port, config.connect_timeout)?;
    Connection::from_stream(stream, config)
}

/// Connect to `127.0.0.1:7326`.
pub fn connect_default() -> Result<Connection> {
    connect(&ConnectionConfig::default())
}

/// A client connection to one ICB server.
///
/// Every call blocks until its packet has been written (or read, for
/// [`Connection::recv`]). Calls take `&mut self`, so a connection shared
/// between threads needs a lock around it.
pub struct Connection {
    host: String,
    port: u16,
    reader: PacketReader<IcbStream>,
    writer: PacketWriter<IcbStream>,
}

impl Connection {
    /// Wrap an already connected stream.
    ///
    /// `config` supplies the timeouts and the host/port reported by
    /// [`Connection::addr`].
    pub fn from_stream(stream: IcbStream, config: &ConnectionConfig) -> Result<Self> {
        let reader_stream = stream.try_clone()?;
        let packet_config = config.packet_config();

        let reader = PacketReader::with_config_stream(reader_stream, packet_config.clone())?;
        let writer = PacketWriter::with_config_stream(stream, packet_config)?;

        Ok(Self {
            host: config.host.clone(),
            port: config.port,
            reader,
            writer,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port` of the server.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Change the read timeout used by [`Connection::recv`].
    ///
    /// A read that times out returns an `Io` error of kind `WouldBlock` or
    /// `TimedOut`; bytes of a partly received packet are kept for the next
    /// call.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)?;
        Ok(())
    }

    /// Send a packet with caller-ordered fields.
    pub fn send_packet<F: AsRef<[u8]>>(
        &mut self,
        packet_type: PacketType,
        fields: &[F],
    ) -> Result<()> {
        self.writer.send(packet_type, fields)?;
        Ok(())
    }

    /// Send the login packet. Must be the first packet after the server's
    /// protocol packet.
    pub fn login(&mut self, options: &LoginOptions) -> Result<()> {
        debug!(
            login_id = %options.login_id,
            nickname = %options.nickname,
            group = options.default_group.as_deref().unwrap_or(""),
            "sending login"
        );
        self.send_packet(PacketType::Login, &options.fields())
    }

    /// Send a public message to the current group.
    pub fn open_message(&mut self, text: &str) -> Result<()> {
        debug!(size = text.len(), "sending open message");
        self.send_packet(PacketType::OpenMessage, &[text])
    }

    /// Alias for [`Connection::open_message`].
    pub fn say(&mut self, text: &str) -> Result<()> {
        self.open_message(text)
    }

    /// Send a private message through the server's `m` command.
    pub fn personal_message(&mut self, nickname: &str, text: &str) -> Result<()> {
        self.command(&CommandOptions::new("m").with_arguments(format!("{nickname} {text}")))
    }

    pub fn command(&mut self, options: &CommandOptions) -> Result<()> {
        debug!(command = %options.command, "sending command");
        self.send_packet(PacketType::Command, &options.fields())
    }

    pub fn protocol(&mut self, options: &ProtocolOptions) -> Result<()> {
        debug!(level = %options.level, "sending protocol packet");
        self.send_packet(PacketType::Protocol, &options.fields())
    }

    /// Send a ping, carrying `identifier` when given.
    pub fn ping(&mut self, identifier: Option<&[u8]>) -> Result<()> {
        let fields: Vec<&[u8]> = identifier.into_iter().collect();
        self.send_packet(PacketType::Ping, &fields)
    }

    /// Send a pong, echoing `identifier` byte for byte when given.
    pub fn pong(&mut self, identifier: Option<&[u8]>) -> Result<()> {
        let fields: Vec<&[u8]> = identifier.into_iter().collect();
        self.send_packet(PacketType::Pong, &fields)
    }

    pub fn noop(&mut self) -> Result<()> {
        self.send_packet::<&[u8]>(PacketType::Noop, &[])
    }

    /// Read one message from the server (blocking).
    pub fn recv(&mut self) -> Result<Message> {
        let message = self.reader.read_message()?;
        debug!(
            packet_type = %message.packet_type(),
            length = message.length(),
            fields = message.fields().len(),
            "received packet"
        );
        Ok(message)
    }

    /// Close the connection.
    pub fn disconnect(self) -> Result<()> {
        debug!(addr = %self.addr(), "disconnecting");
        self.writer.get_ref().shutdown()?;
        Ok(())
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    use icb_packet::{decode, encode, PacketError};

    use super::*;
    use crate::error::ClientError;

    /// Accepts one client and returns every message it sends until it closes.
    fn capture_server() -> (ConnectionConfig, thread::JoinHandle<Vec<Message>>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
        let port = listener.local_addr().expect("listener has addr").port();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("server should accept");
            let mut messages = Vec::new();
            loop {
                match decode(&mut stream) {
                    Ok(msg) => messages.push(msg),
                    Err(PacketError::ConnectionClosed) => return messages,
                    Err(err) => panic!("server decode failed: {err}"),
                }
            }
        });
        let config = ConnectionConfig::new("127.0.0.1", port)
            .with_connect_timeout(Duration::from_secs(5))
            .with_read_timeout(Duration::from_secs(5));
        (config, handle)
    }

    #[test]
    fn sends_each_packet_kind_in_order() {
        let (config, server) = capture_server();
        let mut conn = connect(&config).expect("client should connect");

        conn.login(&LoginOptions::new("alice", "ali").with_group("rust"))
            .unwrap();
        conn.say("hello world").unwrap();
        conn.command(&CommandOptions::new("w")).unwrap();
        conn.protocol(&ProtocolOptions::new()).unwrap();
        conn.ping(Some(&b"abc"[..])).unwrap();
        conn.pong(None).unwrap();
        conn.noop().unwrap();
        conn.disconnect().unwrap();

        let messages = server.join().expect("server thread should complete");
        let types: Vec<PacketType> = messages.iter().map(Message::packet_type).collect();
        assert_eq!(
            types,
            vec![
                PacketType::Login,
                PacketType::OpenMessage,
                PacketType::Command,
                PacketType::Protocol,
                PacketType::Ping,
                PacketType::Pong,
                PacketType::Noop,
            ]
        );

        assert_eq!(messages[0].fields(), &["alice", "ali", "rust", "login"][..]);
        assert_eq!(messages[1].fields(), &["hello world"][..]);
        assert_eq!(messages[3].level(), Some(&b"1"[..]));
        assert_eq!(messages[4].identifier(), Some(&b"abc"[..]));
        assert!(messages[5].fields().is_empty());
        assert!(messages[6].fields().is_empty());
    }

    #[test]
    fn pong_echoes_non_utf8_identifier() {
        let (config, server) = capture_server();
        let mut conn = connect(&config).expect("client should connect");

        let wire = encode(PacketType::Ping, &[&b"\xffk"[..]]).unwrap();
        let ping = decode(&mut wire.as_ref()).unwrap();
        conn.pong(ping.identifier()).unwrap();
        conn.disconnect().unwrap();

        let messages = server.join().expect("server thread should complete");
        assert_eq!(messages[0].packet_type(), PacketType::Pong);
        assert_eq!(messages[0].identifier(), Some(&b"\xffk"[..]));
    }

    #[test]
    fn personal_message_uses_m_command() {
        let (config, server) = capture_server();
        let mut conn = connect(&config).expect("client should connect");

        conn.personal_message("bob", "psst").unwrap();
        conn.disconnect().unwrap();

        let messages = server.join().expect("server thread should complete");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].packet_type(), PacketType::Command);
        assert_eq!(messages[0].fields(), &["m", "bob psst"][..]);
    }

    #[test]
    fn encoding_error_leaves_connection_usable() {
        let (config, server) = capture_server();
        let mut conn = connect(&config).expect("client should connect");

        let err = conn.say(&"x".repeat(400)).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Packet(PacketError::TooLong { .. })
        ));

        conn.say("short").unwrap();
        conn.disconnect().unwrap();

        let messages = server.join().expect("server thread should complete");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].fields(), &["short"][..]);
    }

    #[test]
    fn recv_reads_server_packets() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut wire = Vec::new();
            wire.extend_from_slice(
                &encode(PacketType::Protocol, &["1", "localhost", "test server"]).unwrap(),
            );
            wire.extend_from_slice(&encode::<&str>(PacketType::Login, &[]).unwrap());
            wire.extend_from_slice(&encode(PacketType::OpenMessage, &["bob", "hey"]).unwrap());
            stream.write_all(&wire).unwrap();
        });

        let mut conn = connect(&ConnectionConfig::new("127.0.0.1", port)).unwrap();
        assert_eq!(
            conn.recv().unwrap().server_id(),
            Some(&b"test server"[..])
        );
        assert_eq!(conn.recv().unwrap().packet_type(), PacketType::Login);
        let msg = conn.recv().unwrap();
        assert_eq!(msg.from(), Some(&b"bob"[..]));
        assert_eq!(msg.body(), Some(&b"hey"[..]));

        server.join().unwrap();
        let err = conn.recv().unwrap_err();
        assert!(err.is_closed());
    }

    #[test]
    fn recv_times_out_then_resumes() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let (go_tx, go_rx) = std::sync::mpsc::channel::<()>();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            go_rx.recv().unwrap();
            stream
                .write_all(&encode(PacketType::Ping, &["late"]).unwrap())
                .unwrap();
        });

        let mut conn = connect(&ConnectionConfig::new("127.0.0.1", port)).unwrap();
        conn.set_read_timeout(Some(Duration::from_millis(50))).unwrap();

        let err = conn.recv().unwrap_err();
        assert!(matches!(
            err,
            ClientError::Packet(PacketError::Io(ref io))
                if matches!(io.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut)
        ));

        conn.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        go_tx.send(()).unwrap();
        assert_eq!(conn.recv().unwrap().identifier(), Some(&b"late"[..]));

        server.join().unwrap();
    }

    #[test]
    fn connect_refused_is_transport_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let err = connect(&ConnectionConfig::new("127.0.0.1", port)).unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[test]
    fn from_stream_reports_config_address() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let stream = IcbStream::from_tcp(TcpStream::connect(("127.0.0.1", port)).unwrap());

        let config = ConnectionConfig::new("icb.example.net", 7326);
        let conn = Connection::from_stream(stream, &config).unwrap();
        assert_eq!(conn.addr(), "icb.example.net:7326");
        assert_eq!(conn.to_string(), "icb.example.net:7326");
        assert_eq!(conn.host(), "icb.example.net");
        assert_eq!(conn.port(), 7326);
        assert!(format!("{conn:?}").contains("icb.example.net"));
    }
}
