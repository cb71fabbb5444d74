//! Proxy subcommand implementation.

use super::{emit, Context, OutputFormat};
use crate::error::CliResult;
use crate::output;
use crate::proxy::ProxyProber;
use clap::Parser;
use std::time::Duration;

/// Check whether host:port answers like an HTTP proxy.
#[derive(Parser, Debug)]
pub struct ProxyCommand {
    /// Endpoint to check, as host:port (e.g. 10.0.0.1:8080)
    #[arg(value_name = "HOST:PORT")]
    pub target: String,

    /// Deadline for the whole check in milliseconds
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    /// Output format for results
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

impl ProxyCommand {
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        let settings = &ctx.settings;
        let timeout = self
            .timeout
            .map(Duration::from_millis)
            .unwrap_or_else(|| settings.proxy_timeout());

        let result = ProxyProber::new()
            .with_timeout(timeout)
            .with_sample_limit(settings.sample_limit)
            .probe(&self.target)
            .await?;

        emit(
            self.output.unwrap_or(settings.output),
            ctx.quiet,
            &result,
            |out| output::write_proxy(out, &result),
        )
    }
}
