//! Ports subcommand implementation.

use super::{emit, Context, OutputFormat};
use crate::error::CliResult;
use crate::output;
use crate::types::PortSet;
use clap::Parser;

/// Expand a port specification.
#[derive(Parser, Debug)]
pub struct PortsCommand {
    /// Port specification (e.g. "22,80,8000-8010")
    #[arg(value_name = "SPEC", default_value = "")]
    pub spec: String,

    /// Output format for results
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

impl PortsCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let ports = PortSet::parse_non_empty(&self.spec)?;

        emit(
            self.output.unwrap_or(ctx.settings.output),
            ctx.quiet,
            &ports,
            |out| output::write_ports(out, &ports),
        )
    }
}
