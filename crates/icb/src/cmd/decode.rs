use std::fs::File;
use std::io::{self, Read};

use icb_packet::PacketReader;

use crate::cmd::DecodeArgs;
use crate::exit::{io_error, packet_error, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let (input, source): (Box<dyn Read>, String) = match &args.file {
        Some(path) => {
            let file = File::open(path).map_err(|err| {
                io_error(&format!("failed opening {}", path.display()), err)
            })?;
            (Box::new(file), path.display().to_string())
        }
        None => (Box::new(io::stdin().lock()), "stdin".to_string()),
    };

    for message in PacketReader::new(input) {
        let message = message.map_err(|err| packet_error("decode failed", err))?;
        print_message(&message, &source, format);
    }

    Ok(SUCCESS)
}
