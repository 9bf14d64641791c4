//! Address range enumeration.
//!
//! Expands a start/end pair (or a CIDR block) into the ordered sequence of
//! IPv4 addresses a scan covers. Ranges never fail on a bad end address: they
//! collapse to the start address and hand a [`RangeWarning`] back to the caller.

use crate::types::WorkItem;
use ipnetwork::Ipv4Network;
use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;

/// Error type for target parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("invalid IPv4 address: {0}")]
    InvalidAddress(String),
    #[error("invalid CIDR notation: {0}")]
    InvalidCidr(String),
}

/// Why a requested range was collapsed to its start address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeWarning {
    /// The end address did not parse.
    InvalidEnd(String),
    /// The end address sorts before the start address.
    StartAfterEnd { start: Ipv4Addr, end: Ipv4Addr },
}

impl fmt::Display for RangeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnd(end) => {
                write!(f, "invalid end address '{}', scanning single IP only", end)
            }
            Self::StartAfterEnd { start, end } => write!(
                f,
                "start address {} is greater than end address {}, scanning single IP only",
                start, end
            ),
        }
    }
}

/// An inclusive range of IPv4 addresses, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddressRange {
    start: Ipv4Addr,
    end: Ipv4Addr,
}

impl AddressRange {
    /// A range holding exactly one address.
    pub const fn single(addr: Ipv4Addr) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Build a range, degrading to `start` alone when `end < start`.
    pub fn new(start: Ipv4Addr, end: Option<Ipv4Addr>) -> (Self, Option<RangeWarning>) {
        match end {
            None => (Self::single(start), None),
            Some(end) if u32::from(start) > u32::from(end) => (
                Self::single(start),
                Some(RangeWarning::StartAfterEnd { start, end }),
            ),
            Some(end) => (Self { start, end }, None),
        }
    }

    /// Parse dotted-quad input. Only the start address is mandatory; a blank
    /// end means a single-address scan.
    pub fn parse(
        start: &str,
        end: Option<&str>,
    ) -> Result<(Self, Option<RangeWarning>), TargetError> {
        let start = parse_ipv4(start)?;

        let end = match end.map(str::trim).filter(|e| !e.is_empty()) {
            None => return Ok((Self::single(start), None)),
            Some(end) => end,
        };

        match parse_ipv4(end) {
            Ok(end) => Ok(Self::new(start, Some(end))),
            Err(_) => Ok((
                Self::single(start),
                Some(RangeWarning::InvalidEnd(end.to_string())),
            )),
        }
    }

    /// Cover a CIDR block from its network address through its broadcast address.
    pub fn from_cidr(network: Ipv4Network) -> Self {
        Self {
            start: network.network(),
            end: network.broadcast(),
        }
    }

    /// Parse CIDR notation such as `192.168.1.0/24`.
    pub fn parse_cidr(s: &str) -> Result<Self, TargetError> {
        let network: Ipv4Network = s
            .trim()
            .parse()
            .map_err(|_| TargetError::InvalidCidr(s.trim().to_string()))?;
        Ok(Self::from_cidr(network))
    }

    pub fn start(&self) -> Ipv4Addr {
        self.start
    }

    pub fn end(&self) -> Ipv4Addr {
        self.end
    }

    /// Number of addresses in the range.
    pub fn len(&self) -> u64 {
        u64::from(u32::from(self.end)) - u64::from(u32::from(self.start)) + 1
    }

    /// Always false; a range holds at least its start address.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Every address from start to end, ascending.
    pub fn addresses(&self) -> impl Iterator<Item = Ipv4Addr> {
        (u32::from(self.start)..=u32::from(self.end)).map(Ipv4Addr::from)
    }

    /// Every address paired with every port, address-major.
    ///
    /// The iterator is lazy and can be recreated at will; it yields
    /// `len() * ports.len()` items.
    pub fn work_items<'a>(&self, ports: &'a [u16]) -> impl Iterator<Item = WorkItem> + 'a {
        let range = *self;
        range
            .addresses()
            .flat_map(move |addr| ports.iter().map(move |&port| WorkItem::new(addr, port)))
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{} - {}", self.start, self.end)
        }
    }
}

/// Parse a dotted-quad IPv4 address.
pub fn parse_ipv4(s: &str) -> Result<Ipv4Addr, TargetError> {
    s.trim()
        .parse()
        .map_err(|_| TargetError::InvalidAddress(s.trim().to_string()))
}
