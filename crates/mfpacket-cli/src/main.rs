use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mfpacket_core::{BuildError, Packet, PacketBuilder, ParseError};
use serde::Serialize;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("MFPACKET_BUILD_COMMIT"),
    ", ",
    env!("MFPACKET_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "mfpacket")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Encode and decode MF transport packets.",
    long_about = None,
    after_help = "Examples:\n  mfpacket decode 005001bb00000001000000000a00410600000400\n  mfpacket encode --source-port 80 --destination-port 443 --syn\n  mfpacket decode --file packet.bin --pretty"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG is honoured as well)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode one MF packet and print its fields as JSON.
    Decode {
        /// Packet bytes as hex (whitespace and a 0x prefix are ignored)
        #[arg(required_unless_present = "file")]
        hex: Option<String>,

        /// Read raw packet bytes from a file instead
        #[arg(long, conflicts_with = "hex")]
        file: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Build an MF packet and print its wire bytes as hex.
    Encode(EncodeArgs),
}

#[derive(Args, Debug)]
struct EncodeArgs {
    #[arg(long)]
    source_port: u16,

    #[arg(long)]
    destination_port: u16,

    #[arg(long, default_value_t = 0)]
    sequence_number: u32,

    #[arg(long, default_value_t = 0)]
    ack_number: u32,

    /// 5-bit frequency (0-31)
    #[arg(long, default_value_t = 1)]
    frequency: u8,

    #[arg(long)]
    ack: bool,

    #[arg(long)]
    syn: bool,

    #[arg(long)]
    fin: bool,

    #[arg(long, default_value_t = 1024)]
    window_size: u32,

    /// Payload as hex; its length must be a multiple of 4 bytes
    #[arg(long)]
    payload: Option<String>,

    /// Write raw bytes to this file instead of printing hex
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Decode { hex, file, pretty } => cmd_decode(hex, file, pretty),
        Commands::Encode(args) => cmd_encode(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

impl From<ParseError> for CliError {
    fn from(err: ParseError) -> Self {
        let hint = match err {
            ParseError::TooShort { .. } => "an MF packet has a 20-byte header",
            ParseError::ChecksumMismatch { .. } => {
                "the bytes are corrupted or were not produced by an MF encoder"
            }
            ParseError::TruncatedPayload { .. } => {
                "the data offset declares more payload than the input holds"
            }
        };
        CliError::new(format!("invalid packet: {err}"), Some(hint.to_string()))
    }
}

impl From<BuildError> for CliError {
    fn from(err: BuildError) -> Self {
        let hint = match err {
            BuildError::FrequencyOutOfRange { .. } => "use a frequency between 0 and 31",
            BuildError::UnalignedPayload { .. } => "pad the payload to a multiple of 4 bytes",
            BuildError::PayloadTooLong { .. } => "split the data across several packets",
        };
        CliError::new(format!("cannot build packet: {err}"), Some(hint.to_string()))
    }
}

/// JSON view of a decoded packet.
#[derive(Debug, Serialize)]
struct DecodedPacket {
    source_port: u16,
    destination_port: u16,
    sequence_number: u32,
    ack_number: u32,
    frequency: u8,
    ack: bool,
    syn: bool,
    fin: bool,
    data_offset: u8,
    checksum: u16,
    window_size: u32,
    payload: String,
    is_terminator: bool,
}

impl From<&Packet> for DecodedPacket {
    fn from(packet: &Packet) -> Self {
        Self {
            source_port: packet.source_port,
            destination_port: packet.destination_port,
            sequence_number: packet.sequence_number,
            ack_number: packet.ack_number,
            frequency: packet.frequency(),
            ack: packet.flags.ack,
            syn: packet.flags.syn,
            fin: packet.flags.fin,
            data_offset: packet.data_offset(),
            checksum: packet.checksum(),
            window_size: packet.window_size,
            payload: encode_hex(packet.payload()),
            is_terminator: packet.is_terminator(),
        }
    }
}

fn cmd_decode(hex: Option<String>, file: Option<PathBuf>, pretty: bool) -> Result<(), CliError> {
    let bytes = match (hex, file) {
        (_, Some(path)) => fs::read(&path)
            .with_context(|| format!("Failed to read packet file: {}", path.display()))?,
        (Some(hex), None) => decode_hex(&hex)?,
        (None, None) => {
            return Err(CliError::new(
                "missing packet input",
                Some("pass hex bytes or --file".to_string()),
            ));
        }
    };

    let packet = Packet::parse(&bytes)
        .inspect_err(|err| log::debug!("rejected {} bytes: {}", bytes.len(), err.kind()))?;
    log::debug!(
        "decoded {} bytes: {} -> {}",
        bytes.len(),
        packet.source_port,
        packet.destination_port
    );
    let view = DecodedPacket::from(&packet);
    let json = if pretty {
        serde_json::to_string_pretty(&view)
    } else {
        serde_json::to_string(&view)
    }
    .context("JSON serialization failed")?;
    println!("{}", json);
    Ok(())
}

fn cmd_encode(args: EncodeArgs) -> Result<(), CliError> {
    let payload = match args.payload.as_deref() {
        Some(hex) => decode_hex(hex)?,
        None => Vec::new(),
    };
    let packet = PacketBuilder::new(args.source_port, args.destination_port)
        .sequence_number(args.sequence_number)
        .ack_number(args.ack_number)
        .frequency(args.frequency)
        .ack(args.ack)
        .syn(args.syn)
        .fin(args.fin)
        .window_size(args.window_size)
        .payload(payload)
        .build()?;
    let bytes = packet.to_bytes();

    match args.output {
        Some(path) => {
            fs::write(&path, &bytes)
                .with_context(|| format!("Failed to write packet: {}", path.display()))?;
            eprintln!("OK: {} bytes written -> {}", bytes.len(), path.display());
        }
        None => println!("{}", encode_hex(&bytes)),
    }
    Ok(())
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn decode_hex(input: &str) -> Result<Vec<u8>, CliError> {
    let digits: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(&digits);
    let invalid = || {
        CliError::new(
            format!("invalid hex input '{}'", input.trim()),
            Some("use an even number of hex digits, e.g. 0a0b0c0d".to_string()),
        )
    };
    if digits.len() % 2 != 0 {
        return Err(invalid());
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            digits
                .get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(invalid)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{decode_hex, encode_hex};

    #[test]
    fn hex_round_trip() {
        let bytes = decode_hex("0x00 50 01bb").unwrap();
        assert_eq!(bytes, [0x00, 0x50, 0x01, 0xbb]);
        assert_eq!(encode_hex(&bytes), "005001bb");
    }

    #[test]
    fn hex_rejects_odd_and_invalid_digits() {
        assert!(decode_hex("abc").is_err());
        assert!(decode_hex("zz").is_err());
        assert!(decode_hex("é0").is_err());
        assert_eq!(decode_hex("").unwrap(), Vec::<u8>::new());
    }
}
