//! Scan subcommand implementation.
//!
//! Handles the `probekit scan <host>` command.

use super::{Context, OutputFormat};
use crate::error::CliResult;
use crate::output;
use crate::scanner::{PortScanner, Scheduling};
use crate::types::PortSet;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

/// Sweep a host for open TCP ports.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Host to scan (IP address or hostname)
    #[arg(value_name = "HOST")]
    pub host: String,

    /// Ports to scan (e.g., "80", "22,80,443", "1-1024", "22,8000-9000")
    #[arg(short, long)]
    pub ports: Option<String>,

    /// Connection timeout per port in milliseconds
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    /// Maximum number of connection attempts in flight
    #[arg(short = 'b', long)]
    pub batch_size: Option<usize>,

    /// How attempts are scheduled under the ceiling
    #[arg(long, value_enum)]
    pub scheduling: Option<Scheduling>,

    /// Output format for results
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

impl ScanCommand {
    /// Execute the scan command.
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        let settings = &ctx.settings;
        let range = self.ports.as_deref().unwrap_or(&settings.default_range);
        let format = self.output.unwrap_or(settings.output);
        let timeout = self
            .timeout
            .map(Duration::from_millis)
            .unwrap_or_else(|| settings.scan_timeout());

        let mut scanner = PortScanner::new()
            .with_timeout(timeout)
            .with_batch_size(self.batch_size.unwrap_or(settings.batch_size))
            .with_scheduling(self.scheduling.unwrap_or(settings.scheduling));

        let ports = PortSet::parse(range);
        if ports.is_empty() && !ctx.quiet {
            output::print_warning(&format!("'{}' contains no valid ports.", range));
        }

        let progress = (ctx.verbose && format == OutputFormat::Plain && !ports.is_empty())
            .then(|| progress_bar(ports.len()));
        if let Some(ref pb) = progress {
            scanner = scanner.with_progress(pb.clone());
        }

        let report = scanner.scan(&self.host, range).await?;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        let mut out = io::stdout().lock();
        match format {
            OutputFormat::Plain => output::write_scan(&mut out, &report)?,
            OutputFormat::Json => output::write_json(&mut out, &report)?,
            OutputFormat::Csv => output::write_csv(&mut out, &report)?,
        }
        out.flush()?;

        Ok(())
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}
