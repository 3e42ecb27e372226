use std::process::ExitCode;

use clap::Parser;
use mrf24j40_cat::FrameParser;

/// `cat` for MRF24J40 receive buffers.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The receive buffer, in hex: length octet, PSDU, then optionally the
    /// LQI and RSSI octets.
    #[clap(value_parser(clap::builder::NonEmptyStringValueParser::new()))]
    input: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match FrameParser::parse_hex(&args.input) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("invalid receive buffer: {err:?}");
            ExitCode::FAILURE
        }
    }
}
