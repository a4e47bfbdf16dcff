use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use icb_client::{Connection, ConnectionConfig, LoginOptions};
use icb_packet::{MessageKind, PacketType};
use icb_transport::{DEFAULT_HOST, DEFAULT_PORT};
use tracing::{debug, info};

use crate::exit::{client_error, CliError, CliResult, FAILURE, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod listen;
pub mod say;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode one packet and print its wire bytes.
    Encode(EncodeArgs),
    /// Decode packets from a file or stdin.
    Decode(DecodeArgs),
    /// Log in, send one open message, and disconnect.
    Say(SayArgs),
    /// Log in and print received messages.
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Say(args) => say::run(args),
        Command::Listen(args) => listen::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Packet type: a wire letter (`b`), a short name (`open`), or a full
    /// name (`OPEN_MESSAGE`).
    pub packet_type: PacketType,
    /// Fields, in protocol order.
    pub fields: Vec<String>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// File holding raw packets. Reads stdin when omitted.
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Server host.
    #[arg(long, env = "ICB_HOST", default_value = DEFAULT_HOST)]
    pub host: String,
    /// Server port.
    #[arg(long, env = "ICB_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Bound on connecting and on each read until login is acknowledged
    /// (e.g. 5s, 500ms).
    #[arg(long, default_value = "10s")]
    pub timeout: String,
}

impl ConnectArgs {
    pub fn config(&self) -> CliResult<ConnectionConfig> {
        let timeout = parse_duration(&self.timeout)?;
        Ok(ConnectionConfig::new(self.host.clone(), self.port)
            .with_connect_timeout(timeout)
            .with_read_timeout(timeout))
    }
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Nickname to log in as.
    #[arg(long)]
    pub nick: String,
    /// Login id. Defaults to the nickname.
    #[arg(long)]
    pub login_id: Option<String>,
    /// Group to join.
    #[arg(long, short = 'g')]
    pub group: Option<String>,
    /// Nickname password.
    #[arg(long, env = "ICB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl LoginArgs {
    pub fn options(&self) -> LoginOptions {
        let login_id = self.login_id.as_deref().unwrap_or(&self.nick);
        let mut options = LoginOptions::new(login_id, self.nick.as_str());
        if let Some(group) = &self.group {
            options = options.with_group(group.as_str());
        }
        if let Some(password) = &self.password {
            options = options.with_password(password.as_str());
        }
        options
    }
}

#[derive(Args, Debug)]
pub struct SayArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    #[command(flatten)]
    pub login: LoginArgs,
    /// Message text.
    pub message: String,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    #[command(flatten)]
    pub login: LoginArgs,
    /// Exit after printing N messages.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Send the login packet and wait for the server to accept it.
///
/// Packets before the acknowledgement (the server's protocol packet, status
/// notices) are logged and skipped.
pub fn login(conn: &mut Connection, args: &LoginArgs) -> CliResult<()> {
    conn.login(&args.options())
        .map_err(|err| client_error("login failed", err))?;

    loop {
        let message = conn
            .recv()
            .map_err(|err| client_error("login failed", err))?;
        match message.kind() {
            MessageKind::Login => {
                info!(server = %conn, nick = %args.nick, "logged in");
                return Ok(());
            }
            MessageKind::Error(error) => {
                let reason = error
                    .body()
                    .map(|b| String::from_utf8_lossy(b).into_owned())
                    .unwrap_or_default();
                return Err(CliError::new(
                    FAILURE,
                    format!("login rejected: {reason}"),
                ));
            }
            MessageKind::Exit => {
                return Err(CliError::new(FAILURE, "server closed the session during login"));
            }
            _ => debug!(packet_type = %message.packet_type(), "skipping packet before login"),
        }
    }
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
