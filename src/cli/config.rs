//! Config subcommand implementation.
//!
//! Handles `probekit config` for inspecting and writing the settings file.

use super::Context;
use crate::error::{CliResult, ConfigError};
use crate::output;
use clap::{Parser, Subcommand};
use std::io::{self, Write};

/// Inspect or create the settings file.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Settings file actions.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective settings as JSON
    Show,

    /// Print the settings file location
    Path,

    /// Write the effective settings to the settings file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        match &self.action {
            ConfigAction::Show => {
                let mut out = io::stdout().lock();
                output::write_json(&mut out, &ctx.settings)?;
                out.flush()?;
            }
            ConfigAction::Path => println!("{}", ctx.settings_path()?.display()),
            ConfigAction::Init { force } => {
                let path = self.init(ctx, *force)?;
                if !ctx.quiet {
                    println!("Wrote settings to {}", path.display());
                }
            }
        }
        Ok(())
    }

    /// True when the command creates the settings file rather than reading it.
    pub fn writes_settings(&self) -> bool {
        matches!(self.action, ConfigAction::Init { .. })
    }

    fn init(&self, ctx: &Context, force: bool) -> CliResult<std::path::PathBuf> {
        let path = ctx.settings_path()?;
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists(path).into());
        }

        ctx.settings.save_to(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppSettings;
    use crate::error::CliError;
    use tempfile::TempDir;

    fn init(force: bool) -> ConfigCommand {
        ConfigCommand {
            action: ConfigAction::Init { force },
        }
    }

    #[test]
    fn test_init_writes_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("probekit").join("settings.json");
        let ctx = Context {
            settings: AppSettings {
                batch_size: 64,
                ..AppSettings::default()
            },
            config_path: Some(path.clone()),
            quiet: true,
            ..Context::default()
        };

        init(false).execute(&ctx).unwrap();
        assert_eq!(AppSettings::load_from(&path).unwrap(), ctx.settings);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{}").unwrap();
        let ctx = Context {
            config_path: Some(path.clone()),
            quiet: true,
            ..Context::default()
        };

        assert!(matches!(
            init(false).execute(&ctx),
            Err(CliError::Config(ConfigError::AlreadyExists(_)))
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");

        init(true).execute(&ctx).unwrap();
        assert_eq!(AppSettings::load_from(&path).unwrap(), AppSettings::default());
    }

    #[test]
    fn test_only_init_writes() {
        assert!(init(false).writes_settings());
        let show = ConfigCommand {
            action: ConfigAction::Show,
        };
        assert!(!show.writes_settings());
    }
}
