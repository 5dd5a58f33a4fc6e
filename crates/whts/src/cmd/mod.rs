use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};

use crate::exit::{CliError, CliResult};
use crate::output::OutputFormat;

pub mod config;
pub mod decode;
pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one Backend→Master command to a Master.
    Send(SendArgs),
    /// Listen on a UDP port and print decoded packets.
    Listen(ListenArgs),
    /// Decode hex-encoded wire bytes offline.
    Decode(DecodeArgs),
    /// Manage stored slave configurations.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Config(command) => config::run(command, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Master address (host:port).
    pub remote: String,
    /// Local address to bind.
    #[arg(long, default_value = "0.0.0.0:0")]
    pub bind: String,
    /// Largest datagram to emit; longer messages are fragmented.
    #[arg(long, default_value_t = whts::frame::DEFAULT_MTU)]
    pub mtu: usize,
    /// Wait for one Master→Backend response and print it.
    #[arg(long)]
    pub wait: bool,
    /// Maximum time to wait for a response when --wait is set (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub wait_timeout: String,
    #[command(subcommand)]
    pub message: SendMessage,
}

#[derive(Subcommand, Debug)]
pub enum SendMessage {
    /// Ask the Master for its device list.
    DeviceList,
    /// Start (1) or stop (0) the test cycle.
    Control {
        #[arg(long)]
        running: u8,
    },
    /// Select conduction (0), resistance (1) or clip (2) mode.
    Mode {
        #[arg(long)]
        mode: u8,
    },
    /// Set the TDMA interval in milliseconds.
    Interval {
        #[arg(long)]
        ms: u8,
    },
    /// Switch the UWB radio channel.
    UwbChannel {
        #[arg(long)]
        channel: u8,
    },
    /// Clear the Master's device list.
    ClearDevices,
    /// Reset one or more slaves.
    ResetSlave {
        /// Slave ids, 0x-prefixed hex or decimal; repeat or comma-separate.
        #[arg(long = "id", required = true, value_delimiter = ',', value_parser = parse_u32)]
        ids: Vec<u32>,
        #[arg(long, default_value_t = 0)]
        lock: u8,
        #[arg(long, default_value = "0", value_parser = parse_u16)]
        clip_status: u16,
    },
    /// Push a stored slave configuration.
    SlaveConfig {
        /// Record name in the store.
        name: String,
        #[arg(long, env = "WHTS_STORE", value_name = "PATH")]
        store: Option<PathBuf>,
    },
    /// Have the Master ping a slave.
    Ping {
        /// Target slave id, 0x-prefixed hex or decimal.
        #[arg(long, value_parser = parse_u32)]
        destination: u32,
        #[arg(long, default_value_t = 0)]
        mode: u8,
        #[arg(long, default_value_t = 1)]
        count: u16,
        /// Milliseconds between pings.
        #[arg(long, default_value_t = 1000)]
        interval: u16,
    },
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Local address to bind.
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub bind: String,
    /// Exit after printing N packets.
    #[arg(long)]
    pub count: Option<usize>,
    /// Drop incomplete fragment groups older than this (e.g. 2s, 500ms).
    #[arg(long)]
    pub fragment_timeout: Option<String>,
    /// Print packets on every channel, not just those addressed to the Backend.
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex chunks, fed to the receiver in order (whitespace and ':' ignored).
    #[arg(required = true)]
    pub chunks: Vec<String>,
    /// Receive buffer cap in bytes.
    #[arg(long, default_value_t = whts::frame::MAX_RECEIVE_BUFFER_SIZE)]
    pub max_buffer: usize,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// List stored configurations.
    List(StoreArgs),
    /// Show one configuration.
    Show {
        name: String,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Add or replace a configuration.
    Add {
        name: String,
        /// Slave as `id:conduction:resistance:clipMode:clipStatus`, each field
        /// 0x-prefixed hex or decimal; repeatable.
        #[arg(long = "slave", value_name = "SPEC")]
        slaves: Vec<String>,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Remove a configuration.
    Remove {
        name: String,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Copy a configuration under a fresh name.
    Copy {
        name: String,
        #[command(flatten)]
        store: StoreArgs,
    },
}

#[derive(Args, Debug)]
pub struct StoreArgs {
    /// Store file.
    #[arg(long, env = "WHTS_STORE", value_name = "PATH")]
    pub store: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::usage(format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::usage("duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

/// Parse `0x`-prefixed hex or plain decimal.
pub fn parse_u32(input: &str) -> Result<u32, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|err| format!("invalid number {input:?}: {err}"))
}

pub fn parse_u16(input: &str) -> Result<u16, String> {
    let value = parse_u32(input)?;
    u16::try_from(value).map_err(|_| format!("{input:?} does not fit in 16 bits"))
}

pub fn parse_u8(input: &str) -> Result<u8, String> {
    let value = parse_u32(input)?;
    u8::try_from(value).map_err(|_| format!("{input:?} does not fit in 8 bits"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn parse_numbers_hex_and_decimal() {
        assert_eq!(parse_u32("0x1234").unwrap(), 0x1234);
        assert_eq!(parse_u32("4660").unwrap(), 4660);
        assert_eq!(parse_u16("0xFFFF").unwrap(), 0xFFFF);
        assert!(parse_u16("0x10000").is_err());
        assert!(parse_u8("256").is_err());
        assert!(parse_u32("zz").is_err());
    }
}
