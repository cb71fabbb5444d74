//! Core type definitions using newtype patterns for type safety.
//!
//! These types keep out-of-range ports and malformed targets from ever
//! reaching the network code.

mod port;
mod target;

pub use port::{Port, PortSet};
pub use target::{resolve_host, validate_host, ProxyTarget};
