//! Log in to a server and answer its pings until the session ends.
//!
//! Run with:
//!   cargo run --example ping-pong -- <nick> [group]
//!
//! The server address comes from `ICB_HOST` / `ICB_PORT` (default
//! `127.0.0.1:7326`).

use icb::client::{connect, ConnectionConfig, LoginOptions};
use icb::packet::MessageKind;
use icb::transport::{DEFAULT_HOST, DEFAULT_PORT};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let nick = args.next().ok_or("usage: ping-pong <nick> [group]")?;
    let group = args.next();

    let host = std::env::var("ICB_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = match std::env::var("ICB_PORT") {
        Ok(port) => port.parse()?,
        Err(_) => DEFAULT_PORT,
    };

    let mut conn = connect(&ConnectionConfig::new(host, port))?;
    eprintln!("Connected to {conn}");

    let mut login = LoginOptions::new(nick.as_str(), nick.as_str());
    if let Some(group) = group {
        login = login.with_group(group);
    }
    conn.login(&login)?;

    loop {
        let message = match conn.recv() {
            Ok(message) => message,
            Err(err) if err.is_closed() => break,
            Err(err) => return Err(err.into()),
        };

        match message.kind() {
            MessageKind::Ping(ping) => {
                eprintln!(
                    "ping {}",
                    String::from_utf8_lossy(ping.identifier().unwrap_or_default())
                );
                conn.pong(ping.identifier())?;
            }
            MessageKind::OpenMessage(chat) => {
                eprintln!(
                    "<{}> {}",
                    String::from_utf8_lossy(chat.from().unwrap_or_default()),
                    String::from_utf8_lossy(chat.body().unwrap_or_default())
                );
            }
            MessageKind::Exit => break,
            _ => eprintln!("{}", message.packet_type()),
        }
    }

    conn.disconnect()?;
    Ok(())
}
