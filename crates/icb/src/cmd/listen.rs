use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use icb_client::{connect, ClientError};
use icb_packet::{MessageKind, PacketError};
use tracing::{info, warn};

use crate::cmd::{login, ListenArgs};
use crate::exit::{client_error, CliError, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

/// How often a blocked read wakes up to check for Ctrl-C.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.connect.config()?;
    let mut conn = connect(&config).map_err(|err| client_error("connect failed", err))?;

    login(&mut conn, &args.login)?;
    conn.set_read_timeout(Some(POLL_INTERVAL))
        .map_err(|err| client_error("socket setup failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let peer = conn.to_string();
    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        if args.count.is_some_and(|count| printed >= count) {
            break;
        }

        let message = match conn.recv() {
            Ok(message) => message,
            Err(err) if is_poll_timeout(&err) => continue,
            Err(err) if err.is_closed() => {
                info!(server = %peer, "server closed the connection");
                return Ok(SUCCESS);
            }
            Err(err) => return Err(client_error("receive failed", err)),
        };

        match message.kind() {
            MessageKind::Ping(ping) => {
                conn.pong(ping.identifier())
                    .map_err(|err| client_error("pong failed", err))?;
            }
            MessageKind::Unknown(byte) => {
                warn!(type_byte = *byte, "unknown packet type from server");
            }
            _ => {}
        }

        print_message(&message, &peer, format);
        printed = printed.saturating_add(1);

        if matches!(message.kind(), MessageKind::Exit) {
            info!(server = %peer, "server ended the session");
            return Ok(SUCCESS);
        }
    }

    conn.disconnect()
        .map_err(|err| client_error("disconnect failed", err))?;
    Ok(SUCCESS)
}

fn is_poll_timeout(err: &ClientError) -> bool {
    matches!(
        err,
        ClientError::Packet(PacketError::Io(io))
            if matches!(io.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
    )
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
