//! matkv CLI - store and benchmark encoded arrays in a key-value server

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use matkv_telemetry::{init_logging, LogLevel};

mod commands;
mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "matkv")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// TOML file with [client], [store] and [log] sections
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the key-value server answers
    Ping {
        /// Server address (host:port)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Time a pipelined batch against the file baseline
    Bench {
        /// Server address (host:port), or "memory" for the in-process client
        #[arg(long)]
        addr: Option<String>,
        /// Number of arrays in the batch
        #[arg(long, default_value_t = 100)]
        count: usize,
        /// Slot to read back and verify
        #[arg(long, default_value_t = 40)]
        probe: usize,
        /// Image width
        #[arg(long, default_value_t = 850)]
        width: u32,
        /// Image height
        #[arg(long, default_value_t = 600)]
        height: u32,
        /// Directory for the file baseline (a temporary one if omitted)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the header of an encoded array file
    Inspect {
        /// Encoded payload file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    if cli.verbose > 0 || cli.config.is_none() {
        config.log.level = LogLevel::from_verbosity(cli.verbose);
    }
    init_logging(&config.log)?;

    match cli.command {
        Commands::Ping { addr } => {
            if let Some(addr) = addr {
                config.client.addr = addr;
            }
            commands::ping::execute(&config).await
        }
        Commands::Bench {
            addr,
            count,
            probe,
            width,
            height,
            dir,
            json,
        } => {
            if let Some(addr) = addr {
                config.client.addr = addr;
            }
            let opts = commands::bench::BenchOptions {
                count,
                probe,
                width,
                height,
                dir,
            };
            commands::bench::execute(&config, &opts, json).await
        }
        Commands::Inspect { file } => commands::inspect::execute(&file).await,
    }
}
