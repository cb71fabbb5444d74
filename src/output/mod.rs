//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::write_csv;
pub use json_format::write_json;
pub use plain::{print_error, print_warning, write_ports, write_proxy, write_scan, write_subnet};
