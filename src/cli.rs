//! Command line interface for the `nibbleframe` emulator binary.
//!
//! The binary plays the part of the serial line: it pushes request bytes into
//! the processing loop one per tick and prints the responses. This module is
//! also compiled by `build.rs` to render the man page, so it only depends on
//! `clap` and the standard library.

use std::net::SocketAddr;

use clap::Parser;

/// Command line arguments for the `nibbleframe` binary.
#[derive(Debug, Parser)]
#[command(name = "nibbleframe", version, about = "Drive the nibbleframe processing loop with request frames")]
pub struct Cli {
    /// Request frame as hex, header byte first (for example `2400010002`).
    /// Repeat to send several. Defaults to one EMPTY, ADD, DELAY and LOG.
    #[arg(short, long = "frame", value_parser = parse_hex_frame)]
    pub frames: Vec<Vec<u8>>,

    /// Number of times to send the request list.
    #[arg(short, long, default_value_t = 1)]
    pub rounds: u32,

    /// Milliseconds between consecutive bytes of a request.
    #[arg(long, default_value_t = 1)]
    pub byte_gap_ms: u64,

    /// Milliseconds to wait for a response before reporting a timeout.
    #[arg(long, default_value_t = 5000)]
    pub response_timeout_ms: u64,

    /// Length of one DELAY time unit in milliseconds.
    #[arg(long, default_value_t = 1)]
    pub tick_ms: u64,

    /// Intake queue capacity in bytes.
    #[arg(long, default_value_t = 256)]
    pub intake_capacity: usize,

    /// Outbound queue capacity in frames.
    #[arg(long, default_value_t = 8)]
    pub outbound_capacity: usize,

    /// Serve Prometheus metrics on this address.
    #[arg(long)]
    pub metrics_addr: Option<SocketAddr>,
}

/// Parse a hex string such as `43 01f4 5a` into raw bytes.
///
/// Whitespace is ignored. At least one byte is required and the result may
/// not exceed sixteen bytes, the largest encodable frame.
pub fn parse_hex_frame(input: &str) -> Result<Vec<u8>, String> {
    let digits: Vec<char> = input.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.is_empty() {
        return Err("frame must contain at least a header byte".to_owned());
    }
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits in {input:?}"));
    }
    let bytes = digits
        .chunks(2)
        .map(|pair| {
            let text: String = pair.iter().collect();
            u8::from_str_radix(&text, 16).map_err(|e| format!("invalid hex byte {text:?}: {e}"))
        })
        .collect::<Result<Vec<u8>, String>>()?;
    if bytes.len() > 16 {
        return Err(format!("frame of {} bytes exceeds 16", bytes.len()));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rstest::rstest;

    use super::{Cli, parse_hex_frame};

    #[test]
    fn parses_repeated_frames() {
        let cli = Cli::parse_from(["nibbleframe", "--frame", "10", "-f", "24 0001 0002", "--rounds", "3"]);
        assert_eq!(cli.frames, vec![vec![0x10], vec![0x24, 0x00, 0x01, 0x00, 0x02]]);
        assert_eq!(cli.rounds, 3);
        assert_eq!(cli.tick_ms, 1);
        assert!(cli.metrics_addr.is_none());
    }

    #[rstest]
    #[case("")]
    #[case("1")]
    #[case("zz")]
    #[case("60 00000000 00000000 00000000 00000000")]
    fn rejects_malformed_hex(#[case] input: &str) {
        assert!(parse_hex_frame(input).is_err());
    }
}
