//! ---
//! chimera_section: "04-tooling"
//! chimera_subsection: "binary"
//! chimera_type: "source"
//! chimera_scope: "code"
//! chimera_description: "Command line tool for Chimera telemetry samples."
//! chimera_version: "v0.1.0"
//! chimera_owner: "telemetry"
//! ---
use std::path::PathBuf;

use anyhow::Result;
use chimera_common::{init_tracing, AppConfig};
use chimera_devices::Device;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::debug;

mod decode;
mod encode;
mod export;

const DEFAULT_CONFIG_CANDIDATES: [&str; 2] = ["chimera.toml", "config/chimera.toml"];

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    arg_required_else_help = true,
    about = "Chimera telemetry sample utility",
    long_about = None
)]
struct Cli {
    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print version information and exit"
    )]
    version: bool,
    /// Configuration file (overrides CHIMERA_CONFIG and the default search paths).
    #[arg(long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Build a sample from JSON and encode it")]
    Encode(encode::EncodeCommand),
    #[command(about = "Decode a sample or a sample log and print it")]
    Decode(decode::DecodeCommand),
    #[command(about = "Convert a sample log into CSV")]
    Export(export::ExportCommand),
}

/// Device selector shared by every subcommand.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DeviceArg {
    Ecu,
    Inverter,
}

impl From<DeviceArg> for Device {
    fn from(value: DeviceArg) -> Self {
        match value {
            DeviceArg::Ecu => Device::Ecu,
            DeviceArg::Inverter => Device::Inverter,
        }
    }
}

fn load_config(explicit: Option<&PathBuf>) -> Result<AppConfig> {
    match explicit {
        Some(path) => AppConfig::from_path(path),
        None => {
            let loaded = AppConfig::load_with_source(&DEFAULT_CONFIG_CANDIDATES)?;
            Ok(loaded.config)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("chimeractl {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    let config = load_config(cli.config.as_ref())?;
    init_tracing("chimeractl", &config.logging)?;
    debug!(config = ?cli.config, "configuration resolved");

    match cli.command {
        Some(Commands::Encode(cmd)) => cmd.execute()?,
        Some(Commands::Decode(cmd)) => cmd.execute(&config)?,
        Some(Commands::Export(cmd)) => cmd.execute(&config)?,
        None => {}
    }
    Ok(())
}
