mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "whts", version, about = "WHTS protocol backend CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::{ConfigCommand, SendMessage};

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "whts",
            "send",
            "192.168.1.10:8080",
            "--mtu",
            "64",
            "control",
            "--running",
            "1",
        ])
        .expect("send args should parse");

        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.mtu, 64);
                assert!(matches!(args.message, SendMessage::Control { running: 1 }));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_reset_slave_ids() {
        let cli = Cli::try_parse_from([
            "whts",
            "send",
            "127.0.0.1:9000",
            "reset-slave",
            "--id",
            "0x10,0x20",
            "--id",
            "48",
        ])
        .expect("reset args should parse");

        match cli.command {
            Command::Send(args) => match args.message {
                SendMessage::ResetSlave { ids, .. } => assert_eq!(ids, vec![0x10, 0x20, 48]),
                other => panic!("unexpected message {other:?}"),
            },
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn bare_ids_are_decimal_and_prefixed_ids_are_hex() {
        let destination = |raw: &str| {
            let cli = Cli::try_parse_from([
                "whts",
                "send",
                "127.0.0.1:9000",
                "ping",
                "--destination",
                raw,
            ])
            .expect("ping args should parse");
            match cli.command {
                Command::Send(args) => match args.message {
                    SendMessage::Ping { destination, .. } => destination,
                    other => panic!("unexpected message {other:?}"),
                },
                other => panic!("unexpected command {other:?}"),
            }
        };

        assert_eq!(destination("1234"), 1234);
        assert_eq!(destination("0x1234"), 0x1234);
        assert_eq!(destination("0X00ab"), 0xAB);
        assert!(Cli::try_parse_from([
            "whts",
            "send",
            "127.0.0.1:9000",
            "ping",
            "--destination",
            "abcd",
        ])
        .is_err());
    }

    #[test]
    fn reset_slave_requires_an_id() {
        let err = Cli::try_parse_from(["whts", "send", "127.0.0.1:9000", "reset-slave"])
            .expect_err("missing --id should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn parses_config_add() {
        let cli = Cli::try_parse_from([
            "whts",
            "config",
            "add",
            "line-a",
            "--slave",
            "0x1234:8:4:1:0",
            "--store",
            "/tmp/store.json",
        ])
        .expect("config add should parse");

        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Add { .. })
        ));
    }

    #[test]
    fn decode_requires_input() {
        let err = Cli::try_parse_from(["whts", "decode"]).expect_err("decode needs hex");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
