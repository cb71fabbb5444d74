//! Subnet subcommand implementation.

use super::{emit, Context, OutputFormat};
use crate::error::CliResult;
use crate::output;
use crate::subnet::{PointToPointPolicy, SubnetInfo};
use clap::Parser;

/// Compute network, broadcast and usable range of an IPv4 CIDR.
#[derive(Parser, Debug)]
pub struct SubnetCommand {
    /// Network in CIDR notation (e.g. 192.168.1.0/24)
    #[arg(value_name = "CIDR")]
    pub cidr: String,

    /// Count both addresses of a /31 as usable hosts (RFC 3021)
    #[arg(long)]
    pub rfc3021: bool,

    /// Output format for results
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

impl SubnetCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let policy = if self.rfc3021 {
            PointToPointPolicy::Rfc3021
        } else {
            ctx.settings.point_to_point
        };
        let info = SubnetInfo::with_policy(&self.cidr, policy)?;

        emit(
            self.output.unwrap_or(ctx.settings.output),
            ctx.quiet,
            &info,
            |out| output::write_subnet(out, &info),
        )
    }
}
