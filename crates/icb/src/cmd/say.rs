use icb_client::connect;

use crate::cmd::{login, SayArgs};
use crate::exit::{client_error, CliResult, SUCCESS};

pub fn run(args: SayArgs) -> CliResult<i32> {
    let config = args.connect.config()?;
    let mut conn = connect(&config).map_err(|err| client_error("connect failed", err))?;

    login(&mut conn, &args.login)?;
    conn.say(&args.message)
        .map_err(|err| client_error("send failed", err))?;
    conn.disconnect()
        .map_err(|err| client_error("disconnect failed", err))?;

    Ok(SUCCESS)
}
