use anyhow::Context as _;
use clap::Parser;
use probekit::cli::{Cli, Context};
use probekit::config::AppSettings;
use probekit::output::print_error;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = match &cli.config {
        Some(path) if cli.command.writes_settings() && !path.exists() => AppSettings::default(),
        Some(path) => AppSettings::load_from(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => AppSettings::load().context("loading settings")?,
    };

    let ctx = Context {
        settings,
        config_path: cli.config.clone(),
        verbose: cli.verbose,
        quiet: cli.quiet,
    };
    cli.command.execute(&ctx).await?;
    Ok(())
}

/// Logs go to stderr so JSON and CSV on stdout stay parseable.
fn init_tracing(verbose: bool, quiet: bool) {
    let level = match (verbose, quiet) {
        (true, _) => "warn,probekit=debug",
        (_, true) => "error",
        _ => "warn",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}
