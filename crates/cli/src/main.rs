// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use mmc_cli::client::LassClient;
use mmc_cli::commands::{access, eeprom};
use mmc_cli::{parse_count, parse_u32};

#[derive(Parser)]
#[command(name = "lass")]
#[command(about = "LASS client and flash image inspector for the MMC", long_about = None)]
struct Cli {
    /// Node serving LASS over UDP
    #[arg(long, short, global = true, default_value = "127.0.0.1:50006")]
    target: SocketAddr,

    /// How long to wait for a reply
    #[arg(long, global = true, default_value_t = 500)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read words from the target's address space
    Read {
        #[arg(value_parser = parse_u32)]
        address: u32,

        /// Repetitions; more than one is sent as a burst on the same address
        #[arg(long, short, default_value_t = 1, value_parser = parse_count)]
        count: usize,
    },
    /// Write one or more words; several values form a burst on the same address
    Write {
        #[arg(value_parser = parse_u32)]
        address: u32,

        #[arg(value_parser = parse_u32, required = true)]
        values: Vec<u32>,
    },
    /// Decode a two-sector record store flash image
    Eeprom {
        image: PathBuf,

        /// Emit JSON instead of tables
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let timeout = Duration::from_millis(cli.timeout_ms);

    match cli.command {
        Commands::Read { address, count } => {
            let client = LassClient::connect(cli.target, timeout)?;
            access::run_read(&client, address, count)
        }
        Commands::Write { address, values } => {
            let client = LassClient::connect(cli.target, timeout)?;
            access::run_write(&client, address, &values)
        }
        Commands::Eeprom { image, json } => eeprom::run(&image, json),
    }
}
