//! Port types and the lenient range parser.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortSet` turns a loose specification such as `"22,80,8000-8010"` into an
//! ascending, deduplicated set of ports.

use crate::error::{InputError, InputResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A validated network port number (1-65535).
///
/// Using a newtype prevents accidental misuse of raw u16 values
/// and ensures port numbers are always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Create a Port from a wider integer, returning None when out of range.
    #[inline]
    pub fn from_i64(value: i64) -> Option<Self> {
        u16::try_from(value).ok().and_then(Self::new)
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// An ascending, deduplicated set of ports built from a range specification.
///
/// Parsing never fails: tokens that do not parse are skipped. An empty or
/// blank specification means [`PortSet::DEFAULT_SPEC`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortSet {
    ports: Vec<Port>,
}

impl PortSet {
    /// Specification used when the caller supplies nothing.
    pub const DEFAULT_SPEC: &'static str = "1-1024";

    /// Parse a comma-separated list of ports and `a-b` ranges.
    ///
    /// - A token containing `-` is split on every `-`; pieces that are not
    ///   integers are discarded and the first two remaining are `a` and `b`.
    ///   It adds every port in `[max(1, a), min(65535, b)]`. Fewer than two
    ///   integers drops the token, and an inverted range contributes nothing.
    /// - A single value is kept only if it is a valid port.
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim();
        let spec = if spec.is_empty() { Self::DEFAULT_SPEC } else { spec };

        let mut ports = BTreeSet::new();
        for token in spec.split(',').map(str::trim) {
            if token.contains('-') {
                let mut bounds = token
                    .split('-')
                    .filter_map(|piece| piece.trim().parse::<i64>().ok());
                let (Some(start), Some(end)) = (bounds.next(), bounds.next()) else {
                    continue;
                };
                let start = start.max(i64::from(Port::MIN));
                let end = end.min(i64::from(Port::MAX));
                ports.extend((start..=end).filter_map(Port::from_i64));
            } else if let Some(port) = token.parse::<i64>().ok().and_then(Port::from_i64) {
                ports.insert(port);
            }
        }

        Self {
            ports: ports.into_iter().collect(),
        }
    }

    /// Like [`PortSet::parse`], but an empty result is an error.
    pub fn parse_non_empty(spec: &str) -> InputResult<Self> {
        let ports = Self::parse(spec);
        if ports.is_empty() {
            Err(InputError::EmptyPortSet(spec.to_string()))
        } else {
            Ok(ports)
        }
    }

    /// Ports in ascending order.
    pub fn as_slice(&self) -> &[Port] {
        &self.ports
    }

    /// Iterate over the ports in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Port> + '_ {
        self.ports.iter().copied()
    }

    /// Raw port numbers in ascending order.
    pub fn to_u16_vec(&self) -> Vec<u16> {
        self.ports.iter().map(|p| p.as_u16()).collect()
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

impl<'a> IntoIterator for &'a PortSet {
    type Item = &'a Port;
    type IntoIter = std::slice::Iter<'a, Port>;

    fn into_iter(self) -> Self::IntoIter {
        self.ports.iter()
    }
}

/// Compact form, collapsing consecutive runs: `1-3,22,80`.
impl fmt::Display for PortSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        let mut iter = self.ports.iter().map(|p| p.as_u16()).peekable();
        while let Some(start) = iter.next() {
            let mut end = start;
            while iter.peek() == Some(&end.wrapping_add(1)) {
                end += 1;
                iter.next();
            }
            if start == end {
                parts.push(start.to_string());
            } else {
                parts.push(format!("{}-{}", start, end));
            }
        }
        write!(f, "{}", parts.join(","))
    }
}
