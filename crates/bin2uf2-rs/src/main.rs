use bin2uf2_core::{
    EncodeOptions, TargetAddressMode,
    boards::{BoardInfo, BoardIter},
};
use clap::{Args, Parser, ValueEnum};
use env_logger::Env;
use log::*;

use std::io::Write;

use crate::{convert::convert, deploy::deploy};

mod convert;
mod deploy;
mod reporter;

#[derive(Parser, Debug)]
enum Command {
    /// Convert a raw binary image to a UF2 file on disk
    #[command(arg_required_else_help = true)]
    Convert {
        /// Input binary image
        input: String,

        /// Output UF2 file
        output: String,

        #[command(flatten)]
        target: Target,
    },
    /// Copy a raw binary image onto a mounted UF2 bootloader drive
    #[command(arg_required_else_help = true)]
    Deploy {
        /// Input binary image
        input: String,

        #[command(flatten)]
        target: Target,
    },
}

#[derive(Args, Debug)]
struct Target {
    /// Explicit board (rp2040, rp2350)
    #[clap(short, long, value_parser = board_parser, default_value = "rp2040")]
    board: String,

    /// Flash address of the first image byte, defaults to the start of the board's flash
    #[clap(short = 'a', long, value_parser = parse_address)]
    base_address: Option<u32>,

    /// Advance the target address of every block instead of repeating the base address
    #[clap(long)]
    sequential_addresses: bool,
}

impl Target {
    fn resolve(&self) -> (Box<dyn BoardInfo>, EncodeOptions) {
        let board = BoardIter::find_by_name(&self.board)
            .expect("This already has been verified by board_parser");

        let mut options = EncodeOptions::for_board(board.as_ref());
        if let Some(base_address) = self.base_address {
            options.flash_base_address = base_address;
        }
        if self.sequential_addresses {
            options.target_address_mode = TargetAddressMode::Sequential;
        }

        (board, options)
    }
}

fn board_parser(s: &str) -> Result<String, String> {
    if let Some(board) = BoardIter::find_by_name(s) {
        Ok(board.board_name().to_string())
    } else {
        Err(format!(
            "Unknown board '{}', expected one of: {}",
            s,
            BoardIter::names().join(", ")
        ))
    }
}

fn parse_address(s: &str) -> Result<u32, String> {
    let digits = s.replace('_', "");
    let parsed = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => digits.parse::<u32>(),
    };

    parsed.map_err(|err| format!("Invalid address '{}': {}", s, err))
}

#[derive(Parser, Debug, Default)]
#[clap(version, about, long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Set the logging verbosity
    #[clap(short, long, value_enum, global = true, default_value_t = LogLevel::Info)]
    verbose: LogLevel,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Off => LevelFilter::Off,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default())
        .filter_level(cli.verbose.into())
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            let level = record.level();
            if level == Level::Info {
                writeln!(buf, "{}", record.args())
            } else {
                writeln!(buf, "{}: {}", record.level(), record.args())
            }
        })
        .init();

    let command = match cli.command {
        Some(command) => command,
        None => return Ok(()),
    };

    match command {
        Command::Convert {
            input,
            output,
            target,
        } => {
            let (board, options) = target.resolve();
            convert(&input, &output, board.as_ref(), &options)
        }
        Command::Deploy { input, target } => {
            let (board, options) = target.resolve();
            deploy(&input, board.as_ref(), &options)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_parse_as_hex_or_decimal() {
        assert_eq!(parse_address("0x10000000"), Ok(0x10000000));
        assert_eq!(parse_address("0X1000_0100"), Ok(0x10000100));
        assert_eq!(parse_address("268435456"), Ok(0x10000000));
        assert!(parse_address("0x1_0000_0000").is_err());
        assert!(parse_address("flash").is_err());
    }

    #[test]
    fn board_names_are_normalized() {
        assert_eq!(board_parser("RP2350"), Ok("rp2350".to_string()));
        assert!(board_parser("esp32").is_err());
    }

    #[test]
    fn convert_arguments() {
        let cli = Cli::try_parse_from([
            "bin2uf2-rs",
            "convert",
            "app.bin",
            "app.uf2",
            "--base-address",
            "0x10004000",
            "--sequential-addresses",
        ])
        .unwrap();

        let Some(Command::Convert { target, .. }) = cli.command else {
            panic!("expected the convert command");
        };
        let (board, options) = target.resolve();
        assert_eq!(board.board_name(), "rp2040");
        assert_eq!(options.flash_base_address, 0x10004000);
        assert_eq!(options.block_payload_size, 256);
        assert_eq!(options.target_address_mode, TargetAddressMode::Sequential);
    }

    #[test]
    fn target_defaults_follow_the_board() {
        let cli = Cli::try_parse_from(["bin2uf2-rs", "deploy", "app.bin", "-b", "rp2350"]).unwrap();

        let Some(Command::Deploy { target, .. }) = cli.command else {
            panic!("expected the deploy command");
        };
        let (board, options) = target.resolve();
        assert_eq!(board.board_name(), "rp2350");
        assert_eq!(options, EncodeOptions::for_board(board.as_ref()));
    }
}
