use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::{PgCallError, Result};

/// A network address with prefix length, covering both `inet` and `cidr`.
///
/// A bare host address carries the full prefix for its family (32 for IPv4,
/// 128 for IPv6), which is what distinguishes `inet` from `cidr` during
/// classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InetValue {
    addr: IpAddr,
    prefix: u8,
}

impl InetValue {
    pub fn new(addr: IpAddr, prefix: u8) -> Result<Self> {
        if prefix > Self::max_prefix(&addr) {
            return Err(PgCallError::TypeConversion(format!(
                "prefix length {} out of range for {}",
                prefix, addr
            )));
        }
        Ok(InetValue { addr, prefix })
    }

    /// A single host address (full-length prefix).
    pub fn host(addr: IpAddr) -> Self {
        InetValue {
            prefix: Self::max_prefix(&addr),
            addr,
        }
    }

    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// True when the address denotes a single host rather than a network.
    pub fn is_host(&self) -> bool {
        self.prefix == Self::max_prefix(&self.addr)
    }

    /// Accepts both the bare-host form (`1.2.3.4`) and CIDR notation
    /// (`10.0.0.0/8`).
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed.split_once('/') {
            Some((addr_part, prefix_part)) => {
                let addr: IpAddr = addr_part.parse().map_err(|_| {
                    PgCallError::TypeConversion(format!("invalid network address: {trimmed}"))
                })?;
                let prefix: u8 = prefix_part.parse().map_err(|_| {
                    PgCallError::TypeConversion(format!("invalid prefix length: {prefix_part}"))
                })?;
                Self::new(addr, prefix)
            }
            None => {
                let addr: IpAddr = trimmed.parse().map_err(|_| {
                    PgCallError::TypeConversion(format!("invalid network address: {trimmed}"))
                })?;
                Ok(Self::host(addr))
            }
        }
    }

    fn max_prefix(addr: &IpAddr) -> u8 {
        match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        }
    }
}

// CIDR notation, the form both encoder modes emit
impl fmt::Display for InetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

impl FromStr for InetValue {
    type Err = PgCallError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host() {
        let addr = InetValue::parse("1.2.3.4").unwrap();
        assert_eq!(addr.prefix(), 32);
        assert!(addr.is_host());
        assert_eq!(addr.to_string(), "1.2.3.4/32");
    }

    #[test]
    fn test_parse_cidr() {
        let net = InetValue::parse("10.0.0.0/8").unwrap();
        assert_eq!(net.prefix(), 8);
        assert!(!net.is_host());
        assert_eq!(net.to_string(), "10.0.0.0/8");
    }

    #[test]
    fn test_parse_ipv6() {
        let net = InetValue::parse("2001:db8::/32").unwrap();
        assert_eq!(net.prefix(), 32);
        assert!(!net.is_host());

        let host = InetValue::parse("2001:db8::1").unwrap();
        assert_eq!(host.prefix(), 128);
        assert!(host.is_host());
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(InetValue::parse("not-an-address").is_err());
        assert!(InetValue::parse("1.2.3.4/33").is_err());
        assert!(InetValue::parse("2001:db8::/129").is_err());
    }
}
