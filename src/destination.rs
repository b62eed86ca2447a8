use crate::{PingError, PingResult};
use std::fmt;
use std::net::{SocketAddr, SocketAddrV4, ToSocketAddrs};

/// Port 7 (echo), used when the destination names no port.
pub const DEFAULT_ECHO_PORT: u16 = 7;

/// A `host:port` destination. Resolved on every send so DNS changes are picked up.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Destination(String);

impl Destination {
    /// Inputs without a colon are bare hosts and get the default echo port.
    pub fn normalize(input: &str) -> Self {
        if input.contains(':') {
            Destination(input.to_owned())
        } else {
            Destination(format!("{input}:{DEFAULT_ECHO_PORT}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn resolve(&self) -> PingResult<SocketAddrV4> {
        let addrs = self
            .0
            .to_socket_addrs()
            .map_err(|e| PingError::Resolution(format!("{}: {e}", self.0)))?;
        for addr in addrs {
            if let SocketAddr::V4(addr) = addr {
                return Ok(addr);
            }
        }
        Err(PingError::Resolution(format!("{}: no IPv4 address", self.0)))
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
