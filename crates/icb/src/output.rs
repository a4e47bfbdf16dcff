use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use icb_packet::{Message, MessageKind, PacketType};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    packet_type: String,
    type_byte: String,
    length: u32,
    fields: Vec<String>,
    peer: &'a str,
    timestamp: String,
}

#[derive(Serialize)]
struct EncodedOutput {
    packet_type: String,
    length: usize,
    hex: String,
}

pub fn print_message(message: &Message, peer: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                packet_type: message.packet_type().to_string(),
                type_byte: type_char(message.packet_type()),
                length: message.length(),
                fields: message.fields().iter().map(|f| text(f)).collect(),
                peer,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "LENGTH", "PEER", "FIELDS"])
                .add_row(vec![
                    message.packet_type().to_string(),
                    message.length().to_string(),
                    peer.to_string(),
                    message
                        .fields()
                        .iter()
                        .map(|f| text(f))
                        .collect::<Vec<_>>()
                        .join(" | "),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", pretty_line(message)),
        OutputFormat::Raw => {
            let mut data = Vec::new();
            for (i, field) in message.fields().iter().enumerate() {
                if i > 0 {
                    data.push(b'\t');
                }
                data.extend_from_slice(field);
            }
            data.push(b'\n');
            print_raw(&data);
        }
    }
}

pub fn print_encoded(packet_type: PacketType, wire: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = EncodedOutput {
                packet_type: packet_type.to_string(),
                length: wire.len(),
                hex: hex::encode(wire),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "BYTES", "HEX"])
                .add_row(vec![
                    packet_type.to_string(),
                    wire.len().to_string(),
                    hex::encode(wire),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", hex::encode(wire)),
        OutputFormat::Raw => print_raw(wire),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// One human-readable line per message, in the style of a chat client.
pub fn pretty_line(message: &Message) -> String {
    match message.kind() {
        MessageKind::OpenMessage(chat) => {
            format!("<{}> {}", opt_text(chat.from()), opt_text(chat.body()))
        }
        MessageKind::PersonalMessage(chat) => {
            format!("*{}* {}", opt_text(chat.from()), opt_text(chat.body()))
        }
        MessageKind::Status(status) => format!(
            "[={}=] {}",
            opt_text(status.category()),
            opt_text(status.body())
        ),
        MessageKind::Important(status) => format!(
            "[!{}!] {}",
            opt_text(status.category()),
            opt_text(status.body())
        ),
        MessageKind::Error(error) => format!("[error] {}", opt_text(error.body())),
        MessageKind::Beep(beep) => format!("[beep] {}", opt_text(beep.from())),
        MessageKind::Protocol(info) => format!(
            "[protocol] level={} host={} server={}",
            opt_text(info.level()),
            opt_text(info.host_id()),
            opt_text(info.server_id())
        ),
        MessageKind::Ping(ping) => format!("[ping] {}", opt_text(ping.identifier())),
        MessageKind::Pong(pong) => format!("[pong] {}", opt_text(pong.identifier())),
        _ => {
            let fields: Vec<String> = message.fields().iter().map(|f| text(f)).collect();
            if fields.is_empty() {
                format!("[{}]", message.packet_type())
            } else {
                format!("[{}] {}", message.packet_type(), fields.join(" "))
            }
        }
    }
}

fn type_char(packet_type: PacketType) -> String {
    let byte = packet_type.as_byte();
    if byte.is_ascii_graphic() {
        (byte as char).to_string()
    } else {
        format!("0x{byte:02x}")
    }
}

fn text(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

fn opt_text(field: Option<&[u8]>) -> String {
    field.map(text).unwrap_or_default()
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn message(type_byte: u8, fields: &[&'static str]) -> Message {
        let fields: Vec<Bytes> = fields
            .iter()
            .map(|f| Bytes::from_static(f.as_bytes()))
            .collect();
        Message::new(0, type_byte, fields)
    }

    #[test]
    fn pretty_lines_by_kind() {
        assert_eq!(pretty_line(&message(b'b', &["alice", "hi"])), "<alice> hi");
        assert_eq!(pretty_line(&message(b'c', &["bob", "psst"])), "*bob* psst");
        assert_eq!(
            pretty_line(&message(b'd', &["Status", "You are now in group rust"])),
            "[=Status=] You are now in group rust"
        );
        assert_eq!(pretty_line(&message(b'e', &["no such user"])), "[error] no such user");
        assert_eq!(pretty_line(&message(b'l', &[])), "[ping] ");
        assert_eq!(
            pretty_line(&message(b'i', &["co", "alice  idle 0"])),
            "[COMMAND_OUTPUT_PACKET] co alice  idle 0"
        );
        assert_eq!(pretty_line(&message(b'g', &[])), "[EXIT_PACKET]");
        assert_eq!(pretty_line(&message(b'z', &["x"])), "[UNKNOWN(0x7a)] x");
    }

    #[test]
    fn type_char_handles_unprintable_bytes() {
        assert_eq!(type_char(PacketType::OpenMessage), "b");
        assert_eq!(type_char(PacketType::Unknown(0x02)), "0x02");
    }
}
