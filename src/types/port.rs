//! Port lists for probe targets.
//!
//! Camera web interfaces live on a handful of HTTP ports, so a scan carries a
//! short explicit list rather than the wide ranges of a general port scanner.

use std::fmt;
use std::str::FromStr;

/// Ports probed when the operator does not supply a list.
pub const DEFAULT_PORTS: [u16; 2] = [80, 8080];

/// Error type for port list parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortListError {
    #[error("invalid port number: {0}")]
    InvalidFormat(String),
    #[error("port 0 is not a valid probe target")]
    ZeroPort,
    #[error("invalid port range: start ({0}) > end ({1})")]
    InvalidRange(u16, u16),
    #[error("empty port list")]
    Empty,
}

/// An ordered, deduplicated list of TCP ports.
///
/// Accepts `"80"`, `"80,8080"`, `"8000-8010"` and mixtures of those.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortList(Vec<u16>);

impl PortList {
    /// Build a list from raw ports, sorting and dropping duplicates.
    pub fn new(ports: impl IntoIterator<Item = u16>) -> Result<Self, PortListError> {
        let mut ports: Vec<u16> = ports.into_iter().collect();
        if ports.contains(&0) {
            return Err(PortListError::ZeroPort);
        }
        ports.sort_unstable();
        ports.dedup();
        if ports.is_empty() {
            return Err(PortListError::Empty);
        }
        Ok(Self(ports))
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for PortList {
    fn default() -> Self {
        Self(DEFAULT_PORTS.to_vec())
    }
}

impl FromStr for PortList {
    type Err = PortListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ports = Vec::new();

        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('-') {
                Some((start, end)) => {
                    let start = parse_port(start)?;
                    let end = parse_port(end)?;
                    if start > end {
                        return Err(PortListError::InvalidRange(start, end));
                    }
                    ports.extend(start..=end);
                }
                None => ports.push(parse_port(part)?),
            }
        }

        Self::new(ports)
    }
}

impl fmt::Display for PortList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.0.iter().map(u16::to_string).collect();
        write!(f, "{}", joined.join(","))
    }
}

fn parse_port(s: &str) -> Result<u16, PortListError> {
    s.trim()
        .parse()
        .map_err(|_| PortListError::InvalidFormat(s.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_http_pair() {
        assert_eq!(PortList::default().as_slice(), &[80, 8080]);
    }

    #[test]
    fn test_parse_mixed() {
        let list: PortList = "8080,80,8000-8002".parse().unwrap();
        assert_eq!(list.as_slice(), &[80, 8000, 8001, 8002, 8080]);
        assert_eq!(list.to_string(), "80,8000,8001,8002,8080");
    }

    #[test]
    fn test_parse_deduplicates() {
        let list: PortList = "80,80,8080".parse().unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!("abc".parse::<PortList>(), Err(PortListError::InvalidFormat("abc".into())));
        assert_eq!("90-80".parse::<PortList>(), Err(PortListError::InvalidRange(90, 80)));
        assert_eq!("0".parse::<PortList>(), Err(PortListError::ZeroPort));
        assert_eq!(" , ".parse::<PortList>(), Err(PortListError::Empty));
    }
}
