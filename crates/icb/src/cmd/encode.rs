use icb_packet::encode;

use crate::cmd::EncodeArgs;
use crate::exit::{packet_error, CliResult, SUCCESS};
use crate::output::{print_encoded, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let wire = encode(args.packet_type, &args.fields)
        .map_err(|err| packet_error("encode failed", err))?;
    print_encoded(args.packet_type, &wire, format);
    Ok(SUCCESS)
}
