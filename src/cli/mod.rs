//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `camsweep` - Interactive menu
//! - `camsweep scan <start> [end]` - Scan an address range for cameras
//! - `camsweep trace [target]` - Trace the route to a host
//! - `camsweep info` - Show local address and gateway
//! - `camsweep config` - Show or initialize settings

mod menu;
mod scan;

pub use menu::{Input, MenuChoice};
pub use scan::{run_plan, ScanCommand, ScanPlan};

use crate::config::{AppSettings, Paths};
use crate::error::CliResult;
use crate::output;
use crate::system;
use crate::trace;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// camsweep - find IP camera web interfaces on a network.
///
/// Probes HTTP ports across an IPv4 range and reports endpoints whose
/// responses look like camera or DVR login pages.
#[derive(Parser, Debug)]
#[command(name = "camsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Concurrent IP camera discovery", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute (interactive menu when omitted)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to custom configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan an address range for camera web interfaces
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// Trace the network route to a host
    #[command(alias = "t")]
    Trace(TraceCommand),

    /// Show local address and default gateway
    Info,

    /// Show or initialize the settings file
    Config(ConfigCommand),
}

/// Trace the route to a host.
#[derive(Parser, Debug)]
pub struct TraceCommand {
    /// Destination host (defaults to the configured trace target)
    #[arg(value_name = "TARGET")]
    pub target: Option<String>,
}

/// Show or initialize settings.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Write the default settings file
    #[arg(long)]
    pub init: bool,
}

impl Cli {
    /// Settings from `--config`, or the default location.
    pub fn settings(&self) -> CliResult<AppSettings> {
        let settings = match &self.config {
            Some(path) => AppSettings::load_from(path)?,
            None => AppSettings::load()?,
        };
        Ok(settings)
    }
}

/// Dispatch the parsed command line.
pub async fn run(cli: Cli) -> CliResult<()> {
    let settings = cli.settings()?;

    match &cli.command {
        None => {
            menu::run(&settings).await;
            Ok(())
        }
        Some(Commands::Scan(cmd)) => cmd.execute(&settings, cli.quiet).await,
        Some(Commands::Trace(cmd)) => {
            let target = cmd.target.as_deref().unwrap_or(&settings.trace_target);
            trace::trace_route(target).await?;
            Ok(())
        }
        Some(Commands::Info) => {
            let (local, gateway) =
                tokio::join!(system::local_address(), system::default_gateway());
            println!("Local IP: {}", output::display_or_not_found(local));
            println!("Gateway: {}", output::display_or_not_found(gateway));
            Ok(())
        }
        Some(Commands::Config(cmd)) => show_config(cmd, &cli, &settings),
    }
}

fn show_config(cmd: &ConfigCommand, cli: &Cli, settings: &AppSettings) -> CliResult<()> {
    if cmd.init {
        let path = match &cli.config {
            Some(path) => {
                AppSettings::default().save_to(path)?;
                path.clone()
            }
            None => AppSettings::default().save()?,
        };
        output::print_success(&format!("Default settings written to {}", path.display()));
        return Ok(());
    }

    let path = match &cli.config {
        Some(path) => path.clone(),
        None => Paths::resolve()?.settings_file(),
    };
    output::print_info(&format!("Settings file: {}", path.display()));

    let json = serde_json::to_string_pretty(settings)
        .map_err(crate::error::ConfigError::from)?;
    println!("{}", json);
    Ok(())
}
