//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `probekit scan <host>` - Sweep a host for open TCP ports
//! - `probekit proxy <host:port>` - Check whether an endpoint speaks HTTP
//! - `probekit subnet <cidr>` - Compute IPv4 subnet boundaries
//! - `probekit ports <spec>` - Show how a port specification expands
//! - `probekit config <action>` - Show or create the settings file

mod config;
mod ports;
mod proxy;
mod scan;
mod subnet;

pub use config::{ConfigAction, ConfigCommand};
pub use ports::PortsCommand;
pub use proxy::ProxyCommand;
pub use scan::ScanCommand;
pub use subnet::SubnetCommand;

use crate::config::{AppSettings, Paths};
use crate::error::{CliResult, ConfigResult};
use crate::output;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::{self, StdoutLock, Write};
use std::path::PathBuf;

/// probekit - TCP reachability probes and subnet math.
///
/// Sweeps port ranges with bounded concurrency, checks whether an endpoint
/// behaves like an HTTP proxy, and computes IPv4 subnet boundaries.
#[derive(Parser, Debug)]
#[command(name = "probekit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Concurrent TCP reachability probes and subnet math", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logs, scan progress)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to custom configuration file
    #[arg(long, global = true, value_name = "PATH", env = "PROBEKIT_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sweep a host for open TCP ports
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// Check whether host:port answers like an HTTP proxy
    #[command(alias = "p")]
    Proxy(ProxyCommand),

    /// Compute network, broadcast and usable range of an IPv4 CIDR
    #[command(alias = "n")]
    Subnet(SubnetCommand),

    /// Expand a port specification
    Ports(PortsCommand),

    /// Show or create the settings file
    Config(ConfigCommand),
}

impl Commands {
    /// Run the selected subcommand.
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        match self {
            Self::Scan(cmd) => cmd.execute(ctx).await,
            Self::Proxy(cmd) => cmd.execute(ctx).await,
            Self::Subnet(cmd) => cmd.execute(ctx),
            Self::Ports(cmd) => cmd.execute(ctx),
            Self::Config(cmd) => cmd.execute(ctx),
        }
    }

    /// True when the command creates the settings file, so a missing file
    /// must not stop it from running.
    pub fn writes_settings(&self) -> bool {
        matches!(self, Self::Config(cmd) if cmd.writes_settings())
    }
}

/// Settings and global flags shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub settings: AppSettings,
    /// Settings file given with `--config`, if any.
    pub config_path: Option<PathBuf>,
    pub verbose: bool,
    pub quiet: bool,
}

impl Context {
    /// The `--config` path, or the default settings file.
    pub fn settings_path(&self) -> ConfigResult<PathBuf> {
        match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Paths::new()?.settings_file()),
        }
    }
}

/// Output format for results.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis (scan only)
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Render a non-tabular result: JSON as-is, CSV falls back to plain text.
fn emit<T, F>(format: OutputFormat, quiet: bool, value: &T, plain: F) -> CliResult<()>
where
    T: Serialize,
    F: FnOnce(&mut StdoutLock<'static>) -> io::Result<()>,
{
    let mut out = io::stdout().lock();
    match format {
        OutputFormat::Json => output::write_json(&mut out, value)?,
        OutputFormat::Plain => plain(&mut out)?,
        OutputFormat::Csv => {
            if !quiet {
                output::print_warning("CSV output is only available for scans; using plain text.");
            }
            plain(&mut out)?
        }
    }
    out.flush()?;
    Ok(())
}
