//! IPv4 subnet calculator.
//!
//! All address and mask arithmetic is done on `u32`; `Ipv4Addr` is only used
//! at the edges for display and serialization.

use crate::error::{InputError, InputResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// How a /31 network is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointToPointPolicy {
    /// The general rule: first = network + 1, last = broadcast - 1, and
    /// `broadcast - network - 1` usable hosts, which is 0 for a /31.
    #[default]
    Legacy,
    /// RFC 3021: both addresses of a /31 are usable hosts.
    Rfc3021,
}

/// Boundaries of an IPv4 network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetInfo {
    pub network: Ipv4Addr,
    pub broadcast: Ipv4Addr,
    pub first: Ipv4Addr,
    pub last: Ipv4Addr,
    pub mask: Ipv4Addr,
    pub prefix: u8,
    pub usable_host_count: u64,
}

impl SubnetInfo {
    /// Parse `a.b.c.d/n` and compute the subnet with the legacy /31 rule.
    pub fn from_cidr(cidr: &str) -> InputResult<Self> {
        Self::with_policy(cidr, PointToPointPolicy::default())
    }

    /// Parse `a.b.c.d/n` and compute the subnet.
    pub fn with_policy(cidr: &str, policy: PointToPointPolicy) -> InputResult<Self> {
        let (address, prefix) = parse_cidr(cidr)?;
        Ok(Self::compute(address, prefix, policy))
    }

    /// Compute the subnet for an address and a prefix already known to be <= 32.
    fn compute(address: u32, prefix: u8, policy: PointToPointPolicy) -> Self {
        let mask = prefix_to_mask(prefix);
        let network = address & mask;
        let broadcast = network | !mask;

        let (first, last, usable) = match (prefix, policy) {
            (32, _) => (network, network, 1),
            (31, PointToPointPolicy::Rfc3021) => (network, broadcast, 2),
            _ => (
                network + 1,
                broadcast - 1,
                u64::from(broadcast - network) - 1,
            ),
        };

        Self {
            network: Ipv4Addr::from(network),
            broadcast: Ipv4Addr::from(broadcast),
            first: Ipv4Addr::from(first),
            last: Ipv4Addr::from(last),
            mask: Ipv4Addr::from(mask),
            prefix,
            usable_host_count: usable,
        }
    }
}

impl fmt::Display for SubnetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

/// Compute a subnet from CIDR notation.
pub fn compute_subnet(cidr: &str) -> InputResult<SubnetInfo> {
    SubnetInfo::from_cidr(cidr)
}

/// Mask with the top `prefix` bits set. `prefix` must be <= 32.
pub fn prefix_to_mask(prefix: u8) -> u32 {
    match prefix {
        0 => 0,
        p => u32::MAX << (32 - u32::from(p)),
    }
}

fn parse_cidr(cidr: &str) -> InputResult<(u32, u8)> {
    let cidr = cidr.trim();
    let parts: Vec<&str> = cidr.split('/').collect();
    let [address, prefix] = parts.as_slice() else {
        return Err(InputError::InvalidCidr(cidr.to_string()));
    };

    let prefix = prefix
        .trim()
        .parse::<u8>()
        .ok()
        .filter(|p| *p <= 32)
        .ok_or_else(|| InputError::InvalidPrefix(prefix.to_string()))?;

    Ok((parse_ipv4(address)?, prefix))
}

/// Parse four dot-separated decimal octets into a `u32`, most significant first.
fn parse_ipv4(s: &str) -> InputResult<u32> {
    let invalid = || InputError::InvalidAddress(s.to_string());

    let octets: Vec<&str> = s.trim().split('.').collect();
    if octets.len() != 4 {
        return Err(invalid());
    }

    octets.iter().try_fold(0u32, |acc, octet| {
        if !(1..=3).contains(&octet.len()) || !octet.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let value = octet.parse::<u8>().map_err(|_| invalid())?;
        Ok((acc << 8) | u32::from(value))
    })
}
