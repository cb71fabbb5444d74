//! Configuration management for probekit.
//!
//! Provides XDG-compliant settings storage.

mod settings;

pub use settings::{AppSettings, Paths};
