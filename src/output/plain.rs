//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::proxy::{ProxyClassification, ProxyProbeResult};
use crate::scanner::ScanReport;
use crate::subnet::SubnetInfo;
use crate::types::PortSet;
use console::{style, Style};
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

fn write_banner<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out, "                    {}", style(title).cyan().bold())?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)
}

/// Write a sweep report.
pub fn write_scan<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    write_banner(out, "Port Scan Results")?;

    writeln!(out, "  {} {}", style("Target:").bold(), report.host)?;
    match report.address {
        Some(ip) => writeln!(out, "  {} {}", style("IP Address:").bold(), ip)?,
        None => writeln!(out, "  {} {}", style("IP Address:").bold(), style("unresolved").yellow())?,
    }
    writeln!(
        out,
        "  {} {} ports scanned in {:.2}s, {} open",
        style("Statistics:").bold(),
        report.ports_scanned,
        report.elapsed_ms as f64 / 1000.0,
        style(report.open_ports.len()).green().bold()
    )?;
    writeln!(out)?;

    if report.open_ports.is_empty() {
        writeln!(out, "  {}", style("No open ports found.").dim())?;
    } else {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(out, "  {:>6}  {}", style("PORT").bold(), style("STATE").bold())?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        for port in &report.open_ports {
            writeln!(out, "  {:>6}  {}", port, style("open").green().bold())?;
        }
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())
}

/// Write a proxy check result.
pub fn write_proxy<W: Write>(out: &mut W, result: &ProxyProbeResult) -> io::Result<()> {
    write_banner(out, "Proxy Check")?;

    let verdict = match result.classification {
        ProxyClassification::HttpLike => Style::new().green().bold(),
        ProxyClassification::ConnectedNoHttp => Style::new().yellow(),
        ProxyClassification::Unreachable => Style::new().red(),
    };

    writeln!(out, "  {} {}", style("Target:").bold(), result.target)?;
    writeln!(
        out,
        "  {} {}",
        style("Result:").bold(),
        verdict.apply_to(result.classification.to_string())
    )?;
    writeln!(out, "  {} {}", style("Hint:").bold(), result.hint)?;

    if !result.sample.is_empty() {
        writeln!(out)?;
        writeln!(out, "  {}", style("Sample:").bold())?;
        for line in result.sample.lines() {
            writeln!(out, "    {}", style(line).dim())?;
        }
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())
}

/// Write subnet boundaries.
pub fn write_subnet<W: Write>(out: &mut W, info: &SubnetInfo) -> io::Result<()> {
    write_banner(out, "Subnet")?;

    let rows = [
        ("Network:", info.network.to_string()),
        ("Broadcast:", info.broadcast.to_string()),
        ("First usable:", info.first.to_string()),
        ("Last usable:", info.last.to_string()),
        ("Mask:", format!("{} (/{})", info.mask, info.prefix)),
        ("Usable hosts:", info.usable_host_count.to_string()),
    ];
    for (label, value) in rows {
        writeln!(out, "  {:<14} {}", style(label).bold(), value)?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())
}

/// Write a parsed port set.
pub fn write_ports<W: Write>(out: &mut W, ports: &PortSet) -> io::Result<()> {
    if ports.is_empty() {
        return writeln!(out, "{}", style("No valid ports.").dim());
    }
    writeln!(out, "{} ports: {}", style(ports.len()).bold(), ports)
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}
