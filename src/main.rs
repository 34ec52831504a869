//! Dart Bridge - binary entry point
//!
//! All logic lives in the library and the workspace crates.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dartbridge::{run_bridge, RunOptions};
use dartbridge_app::config;
use dartbridge_core::prelude::*;
use dartbridge_core::Role;

/// Dart Bridge - enter recognized dart rounds into a scoreboard
#[derive(Parser, Debug)]
#[command(name = "dartbridge")]
#[command(about = "Enter recognized dart rounds into a scoreboard", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Working directory holding the surfaces and .dartbridge/
    #[arg(long, value_name = "PATH")]
    dir: Option<PathBuf>,

    /// Role of this process (detected from the surfaces present if omitted)
    #[arg(long, value_name = "producer|consumer")]
    role: Option<Role>,

    /// Enable the bridge right after startup
    #[arg(long)]
    enable: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default .dartbridge/config.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    color_eyre::install().map_err(|e| Error::config(e.to_string()))?;
    dartbridge_core::logging::init()?;

    let workdir = args
        .dir
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    if let Some(Command::Init) = args.command {
        let path = config::init_config_dir(&workdir)?;
        eprintln!("Config: {}", path.display());
        return Ok(());
    }

    let result = run_bridge(RunOptions {
        workdir,
        role: args.role,
        enable: args.enable,
    })
    .await;

    if let Err(ref e) = result {
        error!("Application error: {:?}", e);
        if e.is_fatal() {
            eprintln!("dartbridge: {}", e);
        }
    }

    result
}
